//! # Quote Document
//!
//! The year -> month -> quotes structure served by the remote quote database.
//! The remote payload is untyped JSON with string keys (`{"2020": {"3": ["..."]}}`),
//! so it is validated here once and used as a typed map everywhere else.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Reasons a fetched payload is refused outright.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("quote document is not a JSON object")]
    NotAnObject,
    #[error("quote document contains no quotes")]
    Empty,
    #[error("quote document is not valid JSON: {0}")]
    Json(String),
}

/// Quotes grouped by year, then by month (1-12).
///
/// Every year holds at least one month and every month at least one quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteDocument {
    years: BTreeMap<i32, BTreeMap<u32, Vec<String>>>,
}

impl QuoteDocument {
    /// Parses and validates a raw JSON payload.
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| DocumentError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    /// Builds a document from an already-decoded JSON value.
    ///
    /// Malformed entries (non-numeric keys, months outside 1-12, non-string
    /// quotes) are skipped with a warning. Empty months and years are dropped.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(root) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let mut years = BTreeMap::new();
        for (year_key, months_value) in root {
            let Ok(year) = year_key.trim().parse::<i32>() else {
                tracing::warn!("Skipping non-numeric year key `{}`", year_key);
                continue;
            };
            let Value::Object(months_obj) = months_value else {
                tracing::warn!("Skipping year {}: expected an object of months", year);
                continue;
            };

            let mut months = BTreeMap::new();
            for (month_key, quotes_value) in months_obj {
                let month = match month_key.trim().parse::<u32>() {
                    Ok(m) if (1..=12).contains(&m) => m,
                    _ => {
                        tracing::warn!("Skipping invalid month key `{}` in {}", month_key, year);
                        continue;
                    }
                };
                let Value::Array(entries) = quotes_value else {
                    tracing::warn!("Skipping {}/{}: expected an array of quotes", year, month);
                    continue;
                };

                let quotes: Vec<String> = entries
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Value::String(text) => Some(text),
                        other => {
                            tracing::warn!("Skipping non-string quote in {}/{}: {}", year, month, other);
                            None
                        }
                    })
                    .collect();

                if !quotes.is_empty() {
                    months.insert(month, quotes);
                }
            }

            if !months.is_empty() {
                years.insert(year, months);
            }
        }

        if years.is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(Self { years })
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Months recorded for `year`, if the year exists.
    pub fn year(&self, year: i32) -> Option<&BTreeMap<u32, Vec<String>>> {
        self.years.get(&year)
    }

    pub fn month(&self, year: i32, month: u32) -> Option<&[String]> {
        self.years
            .get(&year)
            .and_then(|months| months.get(&month))
            .map(Vec::as_slice)
    }

    /// Total number of quotes across all years.
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// Every quote as `(year, month, text)`, ordered by date.
    pub fn entries(&self) -> impl Iterator<Item = (i32, u32, &str)> + '_ {
        self.years.iter().flat_map(|(&year, months)| {
            months.iter().flat_map(move |(&month, quotes)| {
                quotes.iter().map(move |quote| (year, month, quote.as_str()))
            })
        })
    }
}
