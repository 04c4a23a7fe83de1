use std::fmt;

use crate::listing::{Listing, ResultSet};

/// Lower bound substituted when a year filter leaves `from` open.
pub const YEAR_RANGE_FLOOR: i32 = 1800;

/// Inclusive model-year bounds; either end may be left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub from: Option<i32>,
    pub to: Option<i32>,
}

impl YearRange {
    /// Substitutes defaults for open ends: `1800` below, `reference_year + 1`
    /// above (one past the data's fetch year, so next-model-year listings
    /// still pass).
    pub fn resolved(&self, reference_year: i32) -> (i32, i32) {
        (
            self.from.unwrap_or(YEAR_RANGE_FLOOR),
            self.to.unwrap_or(reference_year + 1),
        )
    }
}

/// Include/exclude keyword tokens, lower-cased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordCriteria {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl KeywordCriteria {
    /// Comma-splits both fields; blank tokens drop out. Rejects input where
    /// both fields are blank, since that filters on nothing.
    pub fn parse(include: &str, exclude: &str) -> Result<Self, FilterError> {
        let criteria = Self {
            include: split_tokens(include),
            exclude: split_tokens(exclude),
        };
        if criteria.include.is_empty() && criteria.exclude.is_empty() {
            return Err(FilterError::EmptyKeywords);
        }
        Ok(criteria)
    }
}

fn split_tokens(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// The two independently toggleable filter parts. Each has its own set and
/// clear lifecycle; clearing one never disturbs the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub year: Option<YearRange>,
    pub keywords: Option<KeywordCriteria>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.keywords.is_none()
    }
}

/// Synchronous filter rejections. No network call is ever attempted for
/// these; state stays untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// Filtering was requested before any search produced data.
    NoData,
    /// Year `from` resolved above year `to`.
    InvalidYearRange { from: i32, to: i32 },
    /// Keyword filter submitted with both fields blank.
    EmptyKeywords,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::NoData => write!(f, "No data to filter. Please search first."),
            FilterError::InvalidYearRange { from, to } => {
                write!(f, "Year 'from' ({from}) cannot be greater than 'to' ({to}).")
            }
            FilterError::EmptyKeywords => {
                write!(f, "Please provide at least one keyword to filter by.")
            }
        }
    }
}

/// Applies the full criteria against the unfiltered source set.
///
/// Always evaluated from source, never chained off a previous filtered
/// output, so clearing one criterion restores exactly the listings only
/// that criterion had excluded. A listing with no derivable year counts as
/// year 0 and fails any lower bound above zero.
pub fn apply_filters(
    source: &ResultSet,
    criteria: &FilterCriteria,
    reference_year: i32,
) -> ResultSet {
    let passes = |listing: &Listing| {
        if let Some(range) = &criteria.year {
            let (from, to) = range.resolved(reference_year);
            let year = listing.effective_year().unwrap_or(0);
            if year < from || year > to {
                return false;
            }
        }
        if let Some(keywords) = &criteria.keywords {
            let text = listing.title.to_lowercase();
            if !keywords.include.iter().all(|token| text.contains(token)) {
                return false;
            }
            if keywords.exclude.iter().any(|token| text.contains(token)) {
                return false;
            }
        }
        true
    };

    ResultSet::from_listings(source.iter().filter(|listing| passes(listing)).cloned())
}
