use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::timeleft::ordering_key;

/// One auction listing aggregated from a marketplace, identified by `url`.
///
/// Two listings sharing a `url` are the same listing; a later fetch may
/// refresh price or time in place. All other fields are display attributes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Listing {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub time: TimeValue,
    /// Current bid; absent means no bids yet.
    #[serde(default)]
    pub price: Option<String>,
    /// Model year as reported by the feed; derivable from the title when
    /// absent.
    #[serde(default)]
    pub year: Option<i32>,
}

impl Listing {
    /// The feed's year when present, otherwise the first plausible
    /// four-digit year found in the title.
    pub fn effective_year(&self) -> Option<i32> {
        self.year.or_else(|| derive_year(&self.title))
    }
}

/// Scans `title` for the first standalone four-digit number in 1900..=2099.
pub fn derive_year(title: &str) -> Option<i32> {
    let bytes = title.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 4 {
                if let Ok(year) = title[start..i].parse::<i32>() {
                    if (1900..=2099).contains(&year) {
                        return Some(year);
                    }
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// A listing's `time` field, normalized at ingestion.
///
/// The feed mixes three shapes: an ISO-8601 end timestamp, the literal
/// `"N/A"` for marketplace items without a countdown, and (from the oldest
/// feed variant) a pre-rendered remaining-duration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeValue {
    /// Auction with a known end timestamp.
    Deadline(DateTime<Utc>),
    /// No countdown; sorts after all timed listings.
    #[default]
    NoDeadline,
    /// Legacy pre-rendered duration, reduced to whole seconds.
    Legacy(u64),
}

impl TimeValue {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("n/a") {
            return TimeValue::NoDeadline;
        }
        if let Ok(end) = DateTime::parse_from_rfc3339(raw) {
            return TimeValue::Deadline(end.with_timezone(&Utc));
        }
        // Naive timestamps from the scrapers are UTC by contract.
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return TimeValue::Deadline(naive.and_utc());
            }
        }
        match parse_legacy_duration(raw) {
            Some(seconds) => TimeValue::Legacy(seconds),
            // Unreadable debris degrades to "no deadline" rather than erroring.
            None => TimeValue::NoDeadline,
        }
    }
}

impl<'de> Deserialize<'de> for TimeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(TimeValue::NoDeadline, TimeValue::parse))
    }
}

/// Parses `"3 days"`, `"1 day"`, `"4h 5m"`, `"12m"` and the compact
/// `"3d"`/`"45s"` forms into whole seconds.
fn parse_legacy_duration(raw: &str) -> Option<u64> {
    let lower = raw.to_ascii_lowercase();
    let mut total: u64 = 0;
    let mut matched = false;
    let mut tokens = lower.split_whitespace();
    while let Some(token) = tokens.next() {
        let (value, unit) = if let Ok(value) = token.parse::<u64>() {
            // Spelled-out unit arrives as the next token ("2 days").
            (value, tokens.next()?)
        } else {
            let split = token.find(|c: char| !c.is_ascii_digit())?;
            (token[..split].parse::<u64>().ok()?, &token[split..])
        };
        total += match unit {
            "d" | "day" | "days" => value.checked_mul(86_400)?,
            "h" => value.checked_mul(3_600)?,
            "m" => value.checked_mul(60)?,
            "s" => value,
            _ => return None,
        };
        matched = true;
    }
    matched.then_some(total)
}

/// Ordered mapping from listing url to [`Listing`].
///
/// Built wholesale from a fetch response and only ever replaced, never
/// patched afterwards. A duplicate url updates the earlier entry in place,
/// keeping its position, so a later row in the same response can refresh
/// price or time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    entries: Vec<Listing>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let mut set = Self::default();
        for listing in listings {
            set.upsert(listing);
        }
        set
    }

    /// Stable sort by time remaining at `now`; ties keep response order.
    pub fn sorted_by_time_left(mut self, now: DateTime<Utc>) -> Self {
        self.entries
            .sort_by_key(|listing| ordering_key(&listing.time, now));
        self
    }

    /// Inserts the listing, or replaces the entry already holding its url.
    pub fn upsert(&mut self, listing: Listing) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.url == listing.url)
        {
            Some(existing) => *existing = listing,
            None => self.entries.push(listing),
        }
    }

    /// Removes the entry for `url`; returns whether anything was removed.
    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|listing| listing.url != url);
        self.entries.len() != before
    }

    pub fn get(&self, url: &str) -> Option<&Listing> {
        self.entries.iter().find(|listing| listing.url == url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.entries.iter()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|listing| listing.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
