use chrono::{DateTime, Utc};

use crate::listing::Listing;
use crate::state::{IdentityEpoch, RequestToken, UserIdentity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the search input box.
    QueryChanged(String),
    /// User submitted the current query. Empty is legal and fetches the
    /// full listing pool.
    SearchSubmitted,
    /// Engine completion for a search. `token` identifies which submission
    /// this answers; stale tokens are discarded. `fetched_at` is the
    /// engine's completion timestamp, used as "now" for time-left sorting.
    SearchCompleted {
        token: RequestToken,
        fetched_at: DateTime<Utc>,
        result: Result<Vec<Listing>, String>,
    },
    /// User applied a year-range filter; open ends use defaults.
    YearFilterApplied {
        from: Option<i32>,
        to: Option<i32>,
    },
    /// User applied a keyword filter from raw comma-separated input.
    KeywordFilterApplied { include: String, exclude: String },
    /// User cleared the year filter only.
    YearFilterCleared,
    /// User cleared the keyword filter only.
    KeywordFilterCleared,
    /// User reset the whole search: query, results, errors and all filter
    /// criteria go together.
    ResetRequested,
    /// Identity acquired (login or restored session).
    LoggedIn { user: UserIdentity },
    /// Identity lost; saved listings clear locally without a network call.
    LoggedOut,
    /// User toggled the saved flag for a listing.
    SaveToggled { url: String },
    /// Engine completion for the garage fetch issued on login.
    GarageFetched {
        epoch: IdentityEpoch,
        result: Result<Vec<Listing>, String>,
    },
    /// Engine completion for a save request; carries the remote snapshot.
    SaveCompleted {
        epoch: IdentityEpoch,
        url: String,
        result: Result<Listing, String>,
    },
    /// Engine completion for an unsave request.
    UnsaveCompleted {
        epoch: IdentityEpoch,
        url: String,
        result: Result<(), String>,
    },
}
