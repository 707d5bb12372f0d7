// ABOUTME: Bikram-Sambat date parsing and Devanagari rendering for case data trees.
// ABOUTME: Rewrites danda-delimited dates under known date keys as zero-padded YYYY-MM-DD in Devanagari digits.

use std::fmt;

use crate::error::DateError;
use crate::tree::{Scalar, Tree};

/// Separator used by the portal between year, month and day (DEVANAGARI DANDA).
pub const DATE_DELIMITER: char = '।';

/// Keys whose values are converted: registration, verification, hearing, session and generic dates.
pub const DATE_FIELDS: &[&str] = &["दर्ता मिती", "रुजु मिती", "तारेख मिती", "सुनवाइ मिती", "मिती"];

const DEVANAGARI_DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

/// Days in each month of every supported B.S. year, starting at [`BsDate::MIN_YEAR`].
const MONTH_DAYS: [[u8; 12]; 126] = [
    [31, 31, 32, 32, 30, 31, 30, 29, 30, 29, 30, 30], // 1975
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 1976
    [30, 32, 31, 32, 31, 31, 29, 30, 29, 30, 29, 31], // 1977
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 1978
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 1979
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 1980
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 1981
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 1982
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 1983
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 1984
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 1985
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 1986
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 1987
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 1988
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 1989
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 1990
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 1991
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 1992
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 1993
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 1994
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 1995
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 1996
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 1997
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 1998
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 1999
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2000
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2001
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2002
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2003
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2004
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2005
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2006
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2007
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 29, 31], // 2008
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2009
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2010
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2011
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 2012
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2013
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2014
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2015
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 2016
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2017
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2018
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2019
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 2020
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2021
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 2022
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2023
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 2024
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2025
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2026
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2027
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2028
    [31, 31, 32, 31, 32, 30, 30, 29, 30, 29, 30, 30], // 2029
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2030
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2031
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2032
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2033
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2034
    [30, 32, 31, 32, 31, 31, 29, 30, 30, 29, 29, 31], // 2035
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2036
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2037
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2038
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 2039
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2040
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2041
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2042
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 2043
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2044
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2045
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2046
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 2047
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2048
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 2049
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2050
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 2051
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2052
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 2053
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2054
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2055
    [31, 31, 32, 31, 32, 30, 30, 29, 30, 29, 30, 30], // 2056
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2057
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2058
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2059
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2060
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2061
    [30, 32, 31, 32, 31, 31, 29, 30, 29, 30, 29, 31], // 2062
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2063
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2064
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2065
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 29, 31], // 2066
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2067
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2068
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2069
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 2070
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2071
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2072
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2073
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 2074
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2075
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 2076
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2077
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 2078
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2079
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 2080
    [31, 31, 32, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2081
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2082
    [31, 31, 32, 31, 31, 30, 30, 30, 29, 30, 30, 30], // 2083
    [31, 31, 32, 31, 31, 30, 30, 30, 29, 30, 30, 30], // 2084
    [31, 32, 31, 32, 30, 31, 30, 30, 29, 30, 30, 30], // 2085
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2086
    [31, 31, 32, 31, 31, 31, 30, 30, 29, 30, 30, 30], // 2087
    [30, 31, 32, 32, 30, 31, 30, 30, 29, 30, 30, 30], // 2088
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2089
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2090
    [31, 31, 32, 31, 31, 31, 30, 30, 29, 30, 30, 30], // 2091
    [30, 31, 32, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2092
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2093
    [31, 31, 32, 31, 31, 30, 30, 30, 29, 30, 30, 30], // 2094
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 30, 30, 30], // 2095
    [30, 31, 32, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2096
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2097
    [31, 31, 32, 31, 31, 31, 29, 30, 29, 30, 29, 31], // 2098
    [31, 31, 32, 31, 31, 31, 30, 29, 29, 30, 30, 30], // 2099
    [31, 32, 31, 32, 30, 31, 30, 29, 30, 29, 30, 30], // 2100
];

fn days_in_month(year: u32, month: u32) -> u32 {
    u32::from(MONTH_DAYS[(year - BsDate::MIN_YEAR) as usize][month as usize - 1])
}

/// A validated Bikram-Sambat calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BsDate {
    year: u32,
    month: u32,
    day: u32,
}

impl BsDate {
    pub const MIN_YEAR: u32 = 1975;
    pub const MAX_YEAR: u32 = 2100;

    /// Builds a date, rejecting years outside 1975..=2100, months outside 1..=12
    /// and days past the length of that month in that year.
    pub fn new(year: u32, month: u32, day: u32) -> Result<Self, DateError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(DateError::Year(year));
        }
        if !(1..=12).contains(&month) {
            return Err(DateError::Month(month));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(DateError::Day { month, day });
        }
        Ok(Self { year, month, day })
    }

    /// Parses `year<delim>month<delim>day`. Components may use ASCII or Devanagari digits
    /// and may carry surrounding whitespace.
    pub fn parse_delimited(s: &str, delimiter: char) -> Result<Self, DateError> {
        let parts: Vec<&str> = s.split(delimiter).collect();
        if parts.len() != 3 {
            return Err(DateError::ComponentCount(parts.len()));
        }
        let year = parse_component(parts[0])?;
        let month = parse_component(parts[1])?;
        let day = parse_component(parts[2])?;
        Self::new(year, month, day)
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    DEVANAGARI_DIGITS
        .iter()
        .position(|&g| g == c)
        .map(|p| p as u32)
}

/// Parses a non-negative integer written in ASCII or Devanagari digits, ignoring surrounding
/// whitespace.
pub fn parse_number(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for c in s.chars() {
        let d = digit_value(c)?;
        value = value.checked_mul(10)?.checked_add(u64::from(d))?;
    }
    Some(value)
}

fn parse_component(raw: &str) -> Result<u32, DateError> {
    parse_number(raw)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| DateError::NotNumeric(raw.to_string()))
}

/// Maps every ASCII digit to its Devanagari glyph; other characters are kept.
pub fn to_devanagari_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => DEVANAGARI_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

/// Converts a danda-delimited B.S. date into `YYYY-MM-DD` written in Devanagari digits.
///
/// Blank input is returned unchanged. Any parse or validation failure is logged and the
/// original string is returned, so converting an already converted value is a no-op.
pub fn convert_date(value: &str) -> String {
    if value.trim().is_empty() {
        return value.to_string();
    }

    match BsDate::parse_delimited(value, DATE_DELIMITER) {
        Ok(date) => to_devanagari_digits(&date.to_string()),
        Err(err) => {
            tracing::debug!(value, error = %err, "leaving date unconverted");
            value.to_string()
        }
    }
}

/// Returns a copy of `tree` with every string under a [`DATE_FIELDS`] key passed through
/// [`convert_date`]. Values under other keys are recursed into.
pub fn normalize_dates(tree: &Tree) -> Tree {
    match tree {
        Tree::Object(entries) => Tree::Object(
            entries
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        Tree::Scalar(Scalar::String(s)) if DATE_FIELDS.contains(&key.as_str()) => {
                            Tree::string(convert_date(s))
                        }
                        other => normalize_dates(other),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Tree::Array(items) => Tree::Array(items.iter().map(normalize_dates).collect()),
        Tree::Scalar(s) => Tree::Scalar(s.clone()),
    }
}
