//! Partial dates: a calendar date known to year, year-month or full precision.
//!
//! The canonical textual form is ISO-like (`"1980"`, `"1980-03"`,
//! `"1980-03-15"`) and is what the project file stores. GEDCOM uses its own
//! `15 MAR 1980` form; both conversions preserve the precision level.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

static QUALIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(ABT|EST|CAL|BEF|AFT|BET)\s+").unwrap());
static FULL_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+([A-Za-z]{3})\s+(\d{4})").unwrap());
static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z]{3})\s+(\d{4})").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").unwrap());

const GEDCOM_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const MONTHS_IT: [&str; 12] = [
    "gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic",
];

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid partial date {0:?}: expected YYYY, YYYY-MM or YYYY-MM-DD")]
pub struct DateParseError(pub String);

/// A date truncated to year, year-month or year-month-day precision.
///
/// Months are 1-based and always within `1..=12`; days within `1..=31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PartialDate {
    Year(u16),
    YearMonth(u16, u8),
    Full(u16, u8, u8),
}

impl PartialDate {
    pub fn year(&self) -> u16 {
        match *self {
            Self::Year(year) | Self::YearMonth(year, _) | Self::Full(year, _, _) => year,
        }
    }

    /// Reads a GEDCOM `DATE` value.
    ///
    /// Leading qualifiers (`ABT`, `EST`, `CAL`, `BEF`, `AFT`, `BET`) are
    /// dropped, then the first of `DD MON YYYY`, `MON YYYY`, `YYYY` that
    /// matches wins. Unknown month names read as January. Returns `None` when
    /// nothing year-like is present.
    pub fn from_gedcom(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let cleaned = QUALIFIER_RE.replace(value, "");
        let cleaned = cleaned.trim();

        if let Some(caps) = FULL_DATE_RE.captures(cleaned) {
            let year = caps[3].parse::<u16>().ok()?;
            let month = gedcom_month_number(&caps[2]);
            let day = caps[1].parse::<u8>().ok()?;
            // An impossible day keeps what is still trustworthy.
            if (1..=31).contains(&day) {
                return Some(Self::Full(year, month, day));
            }
            return Some(Self::YearMonth(year, month));
        }
        if let Some(caps) = MONTH_YEAR_RE.captures(cleaned) {
            let year = caps[2].parse::<u16>().ok()?;
            return Some(Self::YearMonth(year, gedcom_month_number(&caps[1])));
        }
        if let Some(caps) = YEAR_RE.captures(cleaned) {
            return caps[1].parse::<u16>().ok().map(Self::Year);
        }
        None
    }

    /// Writes the GEDCOM form: `1980`, `MAR 1980` or `15 MAR 1980`.
    pub fn to_gedcom(&self) -> String {
        match *self {
            Self::Year(year) => format!("{year:04}"),
            Self::YearMonth(year, month) => {
                format!("{} {year:04}", GEDCOM_MONTHS[month_index(month)])
            }
            Self::Full(year, month, day) => {
                format!("{day} {} {year:04}", GEDCOM_MONTHS[month_index(month)])
            }
        }
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Year(year) => write!(f, "{year:04}"),
            Self::YearMonth(year, month) => write!(f, "{year:04}-{month:02}"),
            Self::Full(year, month, day) => write!(f, "{year:04}-{month:02}-{day:02}"),
        }
    }
}

impl FromStr for PartialDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DateParseError(s.to_string());
        let mut parts = s.trim().split('-');

        let year_part = parts.next().ok_or_else(invalid)?;
        if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = year_part.parse::<u16>().map_err(|_| invalid())?;

        let month = match parts.next() {
            None => return Ok(Self::Year(year)),
            Some(part) => parse_component(part, 12).ok_or_else(invalid)?,
        };
        let day = match parts.next() {
            None => return Ok(Self::YearMonth(year, month)),
            Some(part) => parse_component(part, 31).ok_or_else(invalid)?,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::Full(year, month, day))
    }
}

impl TryFrom<String> for PartialDate {
    type Error = DateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PartialDate> for String {
    fn from(value: PartialDate) -> Self {
        value.to_string()
    }
}

/// Reads an optional date field from a project file.
///
/// The editor's date inputs are free text, so a value that is not a
/// canonical partial date is not an error: its first four-digit year is
/// kept at year precision (`"circa 1900"` becomes `1900`), and a value with
/// no year reads as `None`. Both cases are logged at `warn`.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<PartialDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    if let Ok(date) = raw.parse::<PartialDate>() {
        return Ok(Some(date));
    }
    let recovered = YEAR_RE
        .captures(&raw)
        .and_then(|caps| caps[1].parse::<u16>().ok())
        .map(PartialDate::Year);
    match recovered {
        Some(date) => warn!(value = %raw, kept = %date, "non-canonical date, kept its year"),
        None => warn!(value = %raw, "non-canonical date without a year, dropped"),
    }
    Ok(recovered)
}

fn parse_component(part: &str, max: u8) -> Option<u8> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = part.parse::<u8>().ok()?;
    (1..=max).contains(&value).then_some(value)
}

fn gedcom_month_number(name: &str) -> u8 {
    let upper = name.to_ascii_uppercase();
    GEDCOM_MONTHS
        .iter()
        .position(|m| *m == upper)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(1)
}

fn month_index(month: u8) -> usize {
    usize::from(month.clamp(1, 12) - 1)
}

/// Display locale for human-readable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    It,
    En,
}

impl Locale {
    fn month_names(self) -> &'static [&'static str; 12] {
        match self {
            Self::It => &MONTHS_IT,
            Self::En => &MONTHS_EN,
        }
    }
}

/// Human-readable date: `1980`, `mar 1980`, `15 mar 1980` (day unpadded).
pub fn format_date(date: Option<&PartialDate>, locale: Locale) -> String {
    let Some(date) = date else {
        return String::new();
    };
    let months = locale.month_names();
    match *date {
        PartialDate::Year(year) => format!("{year:04}"),
        PartialDate::YearMonth(year, month) => format!("{} {year:04}", months[month_index(month)]),
        PartialDate::Full(year, month, day) => {
            format!("{day} {} {year:04}", months[month_index(month)])
        }
    }
}

/// Lifespan label built from years only, e.g. `1920 - 2000` or `? - 2020`.
pub fn format_date_range(birth: Option<&PartialDate>, death: Option<&PartialDate>) -> String {
    match (birth, death) {
        (None, None) => String::new(),
        (Some(birth), None) => format!("{:04}", birth.year()),
        (None, Some(death)) => format!("? - {:04}", death.year()),
        (Some(birth), Some(death)) => format!("{:04} - {:04}", birth.year(), death.year()),
    }
}
