use chrono::{DateTime, TimeZone, Utc};
use gavel_core::{
    update, AppState, Effect, FilterError, Listing, Msg, Notice, TimeValue,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    gavel_logging::initialize_for_tests();
}

fn fetched_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap()
}

fn listing(url: &str, title: &str, year: Option<i32>) -> Listing {
    Listing {
        title: title.to_string(),
        url: url.to_string(),
        image: String::new(),
        time: TimeValue::NoDeadline,
        price: None,
        year,
    }
}

/// Drives a submit/complete cycle so the state holds `listings` as data.
fn ready_state(listings: Vec<Listing>) -> AppState {
    let (state, effects) = update(AppState::new(), Msg::SearchSubmitted);
    let token = match effects.as_slice() {
        [Effect::Search { token, .. }] => *token,
        other => panic!("expected a single search effect, got {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            token,
            fetched_at: fetched_at(),
            result: Ok(listings),
        },
    );
    state
}

fn visible_urls(state: &AppState) -> Vec<String> {
    state
        .visible()
        .map(|set| set.urls().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

#[test]
fn year_range_bounds_are_inclusive() {
    init_logging();
    let state = ready_state(vec![
        listing("https://a", "Porsche 911", Some(2010)),
        listing("https://b", "BMW E30", Some(1995)),
    ]);

    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(2000),
            to: Some(2020),
        },
    );
    assert_eq!(visible_urls(&state), vec!["https://a"]);

    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(1995),
            to: Some(1995),
        },
    );
    assert_eq!(visible_urls(&state), vec!["https://b"]);
}

#[test]
fn clearing_year_filter_recomputes_keyword_set_from_source() {
    init_logging();
    // The 1970 tribute is excluded by year but matches the keyword; only a
    // recompute from the unfiltered source can bring it back.
    let state = ready_state(vec![
        listing("https://a", "Porsche 911", Some(2010)),
        listing("https://b", "BMW E30", Some(1995)),
        listing("https://c", "BMW 911 tribute", Some(1970)),
    ]);

    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(2000),
            to: Some(2020),
        },
    );
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "911".to_string(),
            exclude: String::new(),
        },
    );
    assert_eq!(visible_urls(&state), vec!["https://a"]);

    let (state, _) = update(state, Msg::YearFilterCleared);
    assert_eq!(visible_urls(&state), vec!["https://a", "https://c"]);
}

#[test]
fn clearing_keyword_filter_reapplies_year_only() {
    init_logging();
    let state = ready_state(vec![
        listing("https://a", "Porsche 911", Some(2010)),
        listing("https://b", "BMW E30", Some(2005)),
    ]);

    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(2000),
            to: Some(2020),
        },
    );
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "911".to_string(),
            exclude: String::new(),
        },
    );
    assert_eq!(visible_urls(&state), vec!["https://a"]);

    let (state, _) = update(state, Msg::KeywordFilterCleared);
    assert_eq!(visible_urls(&state), vec!["https://a", "https://b"]);
    assert!(state.criteria().year.is_some());
    assert!(state.criteria().keywords.is_none());
}

#[test]
fn inverted_year_range_is_rejected_without_mutating_the_view() {
    init_logging();
    let state = ready_state(vec![listing("https://a", "Porsche 911", Some(2010))]);
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "porsche".to_string(),
            exclude: String::new(),
        },
    );
    let filtered_before = state.filtered().cloned();

    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(2020),
            to: Some(2000),
        },
    );

    assert_eq!(
        state.notice(),
        Some(Notice::FilterRejected(FilterError::InvalidYearRange {
            from: 2020,
            to: 2000
        }))
    );
    assert_eq!(state.filtered().cloned(), filtered_before);
    assert!(state.criteria().year.is_none());
}

#[test]
fn lower_bound_above_the_open_default_ceiling_is_rejected() {
    init_logging();
    // Open `to` resolves to fetch-year + 1 = 2027; from 2050 inverts it.
    let state = ready_state(vec![listing("https://a", "Porsche 911", Some(2010))]);
    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(2050),
            to: None,
        },
    );
    assert_eq!(
        state.notice(),
        Some(Notice::FilterRejected(FilterError::InvalidYearRange {
            from: 2050,
            to: 2027
        }))
    );
}

#[test]
fn filtering_without_data_is_rejected() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::YearFilterApplied {
            from: Some(2000),
            to: Some(2020),
        },
    );
    assert_eq!(
        state.notice(),
        Some(Notice::FilterRejected(FilterError::NoData))
    );

    let (state, _) = update(
        AppState::new(),
        Msg::KeywordFilterApplied {
            include: "911".to_string(),
            exclude: String::new(),
        },
    );
    assert_eq!(
        state.notice(),
        Some(Notice::FilterRejected(FilterError::NoData))
    );
}

#[test]
fn blank_keyword_input_is_rejected() {
    init_logging();
    let state = ready_state(vec![listing("https://a", "Porsche 911", Some(2010))]);
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "  ".to_string(),
            exclude: " , ".to_string(),
        },
    );
    assert_eq!(
        state.notice(),
        Some(Notice::FilterRejected(FilterError::EmptyKeywords))
    );
    assert!(state.criteria().keywords.is_none());
}

#[test]
fn listing_without_a_derivable_year_counts_as_zero() {
    init_logging();
    let state = ready_state(vec![
        listing("https://a", "Porsche 911 Turbo", None),
        listing("https://b", "1995 BMW E30", None),
    ]);

    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(1990),
            to: None,
        },
    );
    // The title-derived 1995 passes; the year-less Porsche counts as 0.
    assert_eq!(visible_urls(&state), vec!["https://b"]);
}

#[test]
fn open_upper_bound_admits_next_model_year() {
    init_logging();
    let state = ready_state(vec![listing("https://a", "Porsche 911", Some(2027))]);
    let (state, _) = update(
        state,
        Msg::YearFilterApplied {
            from: Some(2000),
            to: None,
        },
    );
    assert_eq!(visible_urls(&state), vec!["https://a"]);
}

#[test]
fn keyword_include_requires_every_token() {
    init_logging();
    let state = ready_state(vec![
        listing("https://a", "Porsche 911 Carrera S 6-Speed", Some(2010)),
        listing("https://b", "Porsche 911 Carrera", Some(2011)),
    ]);
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "Carrera S, 6-speed".to_string(),
            exclude: String::new(),
        },
    );
    assert_eq!(visible_urls(&state), vec!["https://a"]);
}

#[test]
fn keyword_exclude_drops_any_match() {
    init_logging();
    let state = ready_state(vec![
        listing("https://a", "Porsche 911 GT3", Some(2010)),
        listing("https://b", "Porsche 911 Convertible", Some(2011)),
        listing("https://c", "Porsche 911 Carrera", Some(2012)),
    ]);
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "911".to_string(),
            exclude: "convertible, gt3".to_string(),
        },
    );
    assert_eq!(visible_urls(&state), vec!["https://c"]);
}

#[test]
fn empty_filtered_view_reports_a_distinct_notice() {
    init_logging();
    let state = ready_state(vec![listing("https://a", "Porsche 911", Some(2010))]);
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "lamborghini".to_string(),
            exclude: String::new(),
        },
    );

    assert_eq!(state.notice(), Some(Notice::NoFilterMatches));
    assert_eq!(visible_urls(&state), Vec::<String>::new());
    // The source set is intact; only the derived view is empty.
    assert_eq!(state.data().unwrap().len(), 1);
}

#[test]
fn criteria_survive_a_new_search_and_reapply_to_fresh_data() {
    init_logging();
    let state = ready_state(vec![listing("https://a", "Porsche 911", Some(2010))]);
    let (state, _) = update(
        state,
        Msg::KeywordFilterApplied {
            include: "bmw".to_string(),
            exclude: String::new(),
        },
    );
    assert_eq!(state.notice(), Some(Notice::NoFilterMatches));

    let (state, effects) = update(state, Msg::SearchSubmitted);
    let token = match effects.as_slice() {
        [Effect::Search { token, .. }] => *token,
        other => panic!("expected a single search effect, got {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            token,
            fetched_at: fetched_at(),
            result: Ok(vec![
                listing("https://b", "BMW E30", Some(1995)),
                listing("https://c", "Porsche 356", Some(1962)),
            ]),
        },
    );

    assert_eq!(visible_urls(&state), vec!["https://b"]);
    assert!(state.criteria().keywords.is_some());
}
