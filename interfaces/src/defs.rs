use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label naming the source a record came from. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceTag(String);

impl SourceTag {
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SourceTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SourceTag::new(value).ok_or_else(|| "source tag must not be empty".to_owned())
    }
}

impl From<SourceTag> for String {
    fn from(tag: SourceTag) -> Self {
        tag.0
    }
}

/// Date used to order records. Missing or unreadable dates collapse to
/// [`SortKey::fallback`], which sorts after every real publication date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortKey(NaiveDate);

impl SortKey {
    pub fn fallback() -> Self {
        Self(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    /// Tries each candidate in turn and keeps the first one that parses.
    pub fn resolve<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        candidates
            .into_iter()
            .flatten()
            .find_map(Self::parse)
            .unwrap_or_else(Self::fallback)
    }

    /// Accepts `2023/01/15 00:00`, `2023-01-15`, `2023 Jan 15`, `2023 Jun`,
    /// `2023 Spring` and `2023`. Unknown trailing text after the year pins
    /// the date to January 1.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut tokens = raw.split_whitespace();
        let first = tokens.next()?;

        for format in ["%Y/%m/%d", "%Y-%m-%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(first, format) {
                return Some(Self(date));
            }
        }

        let year = leading_year(first)?;
        let month = tokens.next().and_then(month_number);
        let day = match month {
            Some(_) => tokens.next().and_then(|d| d.parse::<u32>().ok()).unwrap_or(1),
            None => 1,
        };
        let month = month.unwrap_or(1);

        NaiveDate::from_ymd_opt(year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(year, month, 1))
            .map(Self)
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::fallback()
    }
}

fn leading_year(token: &str) -> Option<i32> {
    let digits = token.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token[4..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn month_number(token: &str) -> Option<u32> {
    let prefix = token.get(..3)?.to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub year: String,
    pub sort_key: SortKey,
    pub link: Option<String>,
    pub source_tag: SourceTag,
}

// Object style note:
// Records are built once per run from live responses and never touched
// again. Everything downstream (merge, render, filter) reads them by
// reference; a new run starts from scratch.
