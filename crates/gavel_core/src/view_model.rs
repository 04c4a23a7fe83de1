use chrono::{DateTime, Utc};

use crate::listing::Listing;
use crate::state::{AppState, SearchPhase};
use crate::timeleft::format_time_left;

/// Everything the presentation needs, pre-formatted. Built on demand from
/// [`AppState`]; `now` only affects the time-left labels, never ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: SearchPhase,
    pub query: String,
    pub searched_query: Option<String>,
    /// The visible result rows: filtered view when criteria are active,
    /// otherwise the raw result set.
    pub rows: Vec<ListingRowView>,
    pub notice: Option<String>,
    pub search_error: Option<String>,
    pub username: Option<String>,
    pub garage_rows: Vec<ListingRowView>,
    pub saved_loading: bool,
    pub saved_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRowView {
    pub url: String,
    pub title: String,
    pub year: Option<i32>,
    pub price_label: String,
    pub time_left: String,
    pub saved: bool,
}

impl AppState {
    pub fn view(&self, now: DateTime<Utc>) -> AppViewModel {
        let row = |listing: &Listing| ListingRowView {
            url: listing.url.clone(),
            title: listing.title.clone(),
            year: listing.effective_year(),
            price_label: listing
                .price
                .clone()
                .unwrap_or_else(|| "No Bids".to_string()),
            time_left: format_time_left(&listing.time, now),
            saved: self.is_saved(&listing.url),
        };

        AppViewModel {
            phase: self.phase(),
            query: self.query().to_string(),
            searched_query: self.searched_query().map(ToOwned::to_owned),
            rows: self
                .visible()
                .map(|set| set.iter().map(row).collect())
                .unwrap_or_default(),
            notice: self.notice().map(|notice| notice.to_string()),
            search_error: self.search_error().map(ToOwned::to_owned),
            username: self.identity().map(|user| user.username.clone()),
            garage_rows: self.saved().iter().map(row).collect(),
            saved_loading: self.saved_loading(),
            saved_error: self.saved_error().map(ToOwned::to_owned),
        }
    }
}
