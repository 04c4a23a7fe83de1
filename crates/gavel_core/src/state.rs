use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::{apply_filters, FilterCriteria, FilterError};
use crate::listing::ResultSet;

/// Monotonically increasing search token. Only the completion echoing the
/// latest issued token may land; slower superseded responses are discarded.
pub type RequestToken = u64;

/// Bumped on every identity transition. Garage fetches and save toggles
/// carry the epoch they were issued under; completions from a superseded
/// epoch must not leak into the new identity's saved set.
pub type IdentityEpoch = u64;

/// The authenticated user context gating saved-set access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    pub username: String,
}

/// Search request lifecycle. `Ready`/`Failed` are terminal until the next
/// submission, which goes straight back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// User-facing conditions that are not errors but need distinct wording,
/// so the user knows which step eliminated their matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The search itself came back empty.
    NoSearchResults,
    /// The search had results but the active filters excluded all of them.
    NoFilterMatches,
    /// A filter request was rejected outright; nothing changed.
    FilterRejected(FilterError),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NoSearchResults => write!(f, "No listings match the current search."),
            Notice::NoFilterMatches => write!(f, "No listings match the active filters."),
            Notice::FilterRejected(error) => write!(f, "{error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) query: String,
    pub(crate) searched_query: Option<String>,
    pub(crate) phase: SearchPhase,
    pub(crate) latest_token: RequestToken,
    pub(crate) fetched_at: Option<DateTime<Utc>>,
    pub(crate) data: Option<ResultSet>,
    pub(crate) filtered: Option<ResultSet>,
    pub(crate) criteria: FilterCriteria,
    pub(crate) search_error: Option<String>,
    pub(crate) notice: Option<Notice>,
    pub(crate) identity: Option<UserIdentity>,
    pub(crate) epoch: IdentityEpoch,
    pub(crate) saved: ResultSet,
    pub(crate) saved_loading: bool,
    pub(crate) saved_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The query the current results answer, as opposed to what is being
    /// typed right now.
    pub fn searched_query(&self) -> Option<&str> {
        self.searched_query.as_deref()
    }

    pub fn data(&self) -> Option<&ResultSet> {
        self.data.as_ref()
    }

    pub fn filtered(&self) -> Option<&ResultSet> {
        self.filtered.as_ref()
    }

    /// The set the presentation should display: the filtered view while any
    /// criteria are active, otherwise the raw result set.
    pub fn visible(&self) -> Option<&ResultSet> {
        self.filtered.as_ref().or(self.data.as_ref())
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn search_error(&self) -> Option<&str> {
        self.search_error.as_deref()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    pub fn epoch(&self) -> IdentityEpoch {
        self.epoch
    }

    pub fn latest_token(&self) -> RequestToken {
        self.latest_token
    }

    pub fn is_saved(&self, url: &str) -> bool {
        self.saved.contains(url)
    }

    pub fn saved(&self) -> &ResultSet {
        &self.saved
    }

    pub fn saved_loading(&self) -> bool {
        self.saved_loading
    }

    pub fn saved_error(&self) -> Option<&str> {
        self.saved_error.as_deref()
    }

    pub(crate) fn next_token(&mut self) -> RequestToken {
        self.latest_token += 1;
        self.latest_token
    }

    pub(crate) fn next_epoch(&mut self) -> IdentityEpoch {
        self.epoch += 1;
        self.epoch
    }

    /// Calendar year of the data's fetch timestamp; anchors the year
    /// filter's open upper bound without the core reading a clock.
    pub(crate) fn reference_year(&self) -> Option<i32> {
        self.fetched_at.map(|fetched_at| fetched_at.year())
    }

    /// Recomputes the filtered view from the unfiltered source with the
    /// full current criteria, and refreshes the empty-view notices. The
    /// empty-search notice wins over the empty-filter one: a trivially
    /// empty filtered view says nothing about the filters.
    pub(crate) fn recompute_filtered(&mut self) {
        self.notice = None;
        if self.criteria.is_empty() {
            self.filtered = None;
        } else if let (Some(data), Some(reference_year)) = (&self.data, self.reference_year()) {
            let filtered = apply_filters(data, &self.criteria, reference_year);
            if filtered.is_empty() && !data.is_empty() {
                self.notice = Some(Notice::NoFilterMatches);
            }
            self.filtered = Some(filtered);
        } else {
            self.filtered = None;
        }
        if self.data.as_ref().is_some_and(ResultSet::is_empty) {
            self.notice = Some(Notice::NoSearchResults);
        }
    }
}
