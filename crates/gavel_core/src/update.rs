use crate::filter::{FilterCriteria, FilterError, KeywordCriteria, YearRange};
use crate::listing::ResultSet;
use crate::state::{Notice, SearchPhase};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::QueryChanged(query) => {
            state.query = query;
            Vec::new()
        }
        Msg::SearchSubmitted => {
            // Stale results must never show during a new fetch: data and
            // error clear before the remote call begins. The bumped token
            // also invalidates any search still in flight.
            let token = state.next_token();
            state.phase = SearchPhase::Loading;
            state.searched_query = Some(state.query.clone());
            state.fetched_at = None;
            state.data = None;
            state.filtered = None;
            state.search_error = None;
            state.notice = None;
            vec![Effect::Search {
                token,
                query: state.query.clone(),
            }]
        }
        Msg::SearchCompleted {
            token,
            fetched_at,
            result,
        } => {
            if token != state.latest_token {
                // A superseded request finished late; its outcome is not
                // authoritative.
                return (state, Vec::new());
            }
            match result {
                Ok(listings) => {
                    state.fetched_at = Some(fetched_at);
                    state.data =
                        Some(ResultSet::from_listings(listings).sorted_by_time_left(fetched_at));
                    state.phase = SearchPhase::Ready;
                    state.search_error = None;
                    // Criteria survive across searches; re-derive the view
                    // from the fresh source.
                    state.recompute_filtered();
                }
                Err(message) => {
                    state.phase = SearchPhase::Failed;
                    state.search_error = Some(message);
                    state.fetched_at = None;
                    state.data = None;
                    state.filtered = None;
                    state.notice = None;
                }
            }
            Vec::new()
        }
        Msg::YearFilterApplied { from, to } => {
            apply_year_filter(&mut state, from, to);
            Vec::new()
        }
        Msg::KeywordFilterApplied { include, exclude } => {
            apply_keyword_filter(&mut state, &include, &exclude);
            Vec::new()
        }
        Msg::YearFilterCleared => {
            state.criteria.year = None;
            state.recompute_filtered();
            Vec::new()
        }
        Msg::KeywordFilterCleared => {
            state.criteria.keywords = None;
            state.recompute_filtered();
            Vec::new()
        }
        Msg::ResetRequested => {
            // One atomic step: query, results, errors and both filter
            // criteria go together, never partially.
            state.next_token();
            state.query.clear();
            state.searched_query = None;
            state.phase = SearchPhase::Idle;
            state.fetched_at = None;
            state.data = None;
            state.filtered = None;
            state.criteria = FilterCriteria::default();
            state.search_error = None;
            state.notice = None;
            Vec::new()
        }
        Msg::LoggedIn { user } => {
            let epoch = state.next_epoch();
            state.identity = Some(user);
            state.saved = ResultSet::new();
            state.saved_error = None;
            state.saved_loading = true;
            vec![Effect::FetchGarage { epoch }]
        }
        Msg::LoggedOut => {
            state.next_epoch();
            state.identity = None;
            state.saved = ResultSet::new();
            state.saved_error = None;
            state.saved_loading = false;
            Vec::new()
        }
        Msg::SaveToggled { url } => {
            if state.identity.is_none() {
                vec![Effect::RequestLogin]
            } else if state.is_saved(&url) {
                vec![Effect::DeleteSavedListing {
                    epoch: state.epoch,
                    url,
                }]
            } else {
                vec![Effect::SaveListing {
                    epoch: state.epoch,
                    url,
                }]
            }
        }
        Msg::GarageFetched { epoch, result } => {
            if epoch != state.epoch {
                return (state, Vec::new());
            }
            state.saved_loading = false;
            match result {
                Ok(listings) => {
                    state.saved = ResultSet::from_listings(listings);
                    state.saved_error = None;
                }
                Err(message) => {
                    // Degraded but usable: the saved list renders empty and
                    // the error is available to the presentation.
                    state.saved = ResultSet::new();
                    state.saved_error = Some(message);
                }
            }
            Vec::new()
        }
        Msg::SaveCompleted { epoch, url, result } => {
            if epoch != state.epoch {
                return (state, Vec::new());
            }
            match result {
                Ok(listing) => {
                    debug_assert_eq!(listing.url, url);
                    // Upsert keeps the url present exactly once however many
                    // add attempts resolve.
                    state.saved.upsert(listing);
                    state.saved_error = None;
                }
                Err(message) => state.saved_error = Some(message),
            }
            Vec::new()
        }
        Msg::UnsaveCompleted { epoch, url, result } => {
            if epoch != state.epoch {
                return (state, Vec::new());
            }
            match result {
                Ok(()) => {
                    state.saved.remove(&url);
                    state.saved_error = None;
                }
                Err(message) => state.saved_error = Some(message),
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn apply_year_filter(state: &mut AppState, from: Option<i32>, to: Option<i32>) {
    let (Some(_), Some(reference_year)) = (state.data.as_ref(), state.reference_year()) else {
        state.notice = Some(Notice::FilterRejected(FilterError::NoData));
        return;
    };
    let range = YearRange { from, to };
    let (from, to) = range.resolved(reference_year);
    if from > to {
        state.notice = Some(Notice::FilterRejected(FilterError::InvalidYearRange {
            from,
            to,
        }));
        return;
    }
    state.criteria.year = Some(range);
    state.recompute_filtered();
}

fn apply_keyword_filter(state: &mut AppState, include: &str, exclude: &str) {
    let keywords = match KeywordCriteria::parse(include, exclude) {
        Ok(keywords) => keywords,
        Err(error) => {
            state.notice = Some(Notice::FilterRejected(error));
            return;
        }
    };
    if state.data.is_none() {
        state.notice = Some(Notice::FilterRejected(FilterError::NoData));
        return;
    }
    state.criteria.keywords = Some(keywords);
    state.recompute_filtered();
}
