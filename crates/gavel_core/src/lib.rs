//! Gavel core: pure state machine and view-model helpers for the auction
//! listing browser. No IO lives here; effects go out, messages come back.
mod effect;
mod filter;
mod listing;
mod msg;
mod state;
mod timeleft;
mod update;
mod view_model;

pub use effect::Effect;
pub use filter::{
    apply_filters, FilterCriteria, FilterError, KeywordCriteria, YearRange, YEAR_RANGE_FLOOR,
};
pub use listing::{derive_year, Listing, ResultSet, TimeValue};
pub use msg::Msg;
pub use state::{AppState, IdentityEpoch, Notice, RequestToken, SearchPhase, UserIdentity};
pub use timeleft::{format_time_left, ordering_key};
pub use update::update;
pub use view_model::{AppViewModel, ListingRowView};
