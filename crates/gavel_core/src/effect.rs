use crate::state::{IdentityEpoch, RequestToken};

/// Side effects requested by [`update`](crate::update). The runtime
/// executes these and feeds the outcomes back as messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run a search; the completion must echo `token`.
    Search { token: RequestToken, query: String },
    /// Fetch the saved listings for the identity at `epoch`.
    FetchGarage { epoch: IdentityEpoch },
    /// Save a listing remotely; local state changes only on completion.
    SaveListing { epoch: IdentityEpoch, url: String },
    /// Remove a listing from the remote saved set.
    DeleteSavedListing { epoch: IdentityEpoch, url: String },
    /// A save was attempted without an identity; the presentation should
    /// prompt for login. Not an error.
    RequestLogin,
}
