//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.

use crate::application::dates::month_name;
use crate::domain::types::NotFound;

pub const NO_RESULTS: &str = "No results found.";

pub fn no_results_year(year: i32) -> String {
    format!("No results found for year `{year}`.")
}

pub fn no_results_month(month: u32, year: i32) -> String {
    format!("No results found for {} of {year}.", month_name(month))
}

pub fn no_results_query(query: &str) -> String {
    format!("No results found for query `{query}`.")
}

pub fn not_found(reason: &NotFound) -> String {
    match reason {
        NotFound::Year(year) => no_results_year(*year),
        NotFound::Month { year, month } => no_results_month(*month, *year),
        NotFound::Query(query) => no_results_query(query),
        NotFound::NoQuotes => NO_RESULTS.to_string(),
    }
}

/// Footer under a quote, e.g. "Arraying, March 2020".
pub fn quote_footer(label: &str, month: u32, year: i32) -> String {
    format!("{label}, {} {year}", month_name(month))
}
