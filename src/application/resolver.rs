//! # Quote Resolver
//!
//! Picks one quote from the document for an invocation argument:
//! - no argument: random year, then random month, then random quote;
//! - a date expression: restricted to the named month and/or year;
//! - anything else: fuzzy text search over every quote.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::application::dates::DateParser;
use crate::application::fuzzy::FuzzyMatcher;
use crate::domain::document::QuoteDocument;
use crate::domain::types::{NotFound, Resolution, ResolvedQuote};

pub struct QuoteResolver {
    dates: DateParser,
    matcher: FuzzyMatcher,
}

impl QuoteResolver {
    pub fn new(matcher: FuzzyMatcher) -> Result<Self> {
        Ok(Self {
            dates: DateParser::new()?,
            matcher,
        })
    }

    /// Resolves `argument` against `document`.
    ///
    /// `today` supplies the year for month-only expressions and anchors relative
    /// ones ("last month"). Blank arguments count as no argument.
    pub fn resolve<R>(
        &self,
        document: &QuoteDocument,
        argument: Option<&str>,
        today: NaiveDate,
        rng: &mut R,
    ) -> Resolution
    where
        R: Rng + ?Sized,
    {
        if document.is_empty() {
            return Resolution::NotFound(NotFound::NoQuotes);
        }

        let argument = argument.map(str::trim).filter(|a| !a.is_empty());
        let Some(argument) = argument else {
            return random_quote(document, rng);
        };

        match self.dates.parse(argument, today) {
            Some(date) => match (date.month, date.year) {
                (Some(month), year) => {
                    by_month(document, year.unwrap_or_else(|| today.year()), month, rng)
                }
                (None, Some(year)) => by_year(document, year, rng),
                (None, None) => {
                    tracing::debug!("Date expression {:?} names no month or year", argument);
                    Resolution::Unresolved
                }
            },
            None => self.by_query(document, argument, rng),
        }
    }

    fn by_query<R>(&self, document: &QuoteDocument, query: &str, rng: &mut R) -> Resolution
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<(i32, u32, &str)> = document
            .entries()
            .filter(|(_, _, text)| self.matcher.matches(query, text))
            .collect();
        tracing::debug!("Query {:?} matched {} quote(s)", query, candidates.len());

        match candidates.choose(rng) {
            Some(&(year, month, text)) => found(text, month, year),
            None => Resolution::NotFound(NotFound::Query(query.to_string())),
        }
    }
}

fn random_quote<R>(document: &QuoteDocument, rng: &mut R) -> Resolution
where
    R: Rng + ?Sized,
{
    let years: Vec<i32> = document.years().collect();
    let picked = years.choose(rng).and_then(|&year| {
        let months: Vec<u32> = document.year(year)?.keys().copied().collect();
        let month = *months.choose(rng)?;
        let text = document.month(year, month)?.choose(rng)?;
        Some(found(text, month, year))
    });
    picked.unwrap_or(Resolution::NotFound(NotFound::NoQuotes))
}

fn by_month<R>(document: &QuoteDocument, year: i32, month: u32, rng: &mut R) -> Resolution
where
    R: Rng + ?Sized,
{
    if document.year(year).is_none() {
        return Resolution::NotFound(NotFound::Year(year));
    }
    match document.month(year, month).and_then(|quotes| quotes.choose(rng)) {
        Some(text) => found(text, month, year),
        None => Resolution::NotFound(NotFound::Month { year, month }),
    }
}

fn by_year<R>(document: &QuoteDocument, year: i32, rng: &mut R) -> Resolution
where
    R: Rng + ?Sized,
{
    let Some(months) = document.year(year) else {
        return Resolution::NotFound(NotFound::Year(year));
    };
    let candidates: Vec<(u32, &str)> = months
        .iter()
        .flat_map(|(&month, quotes)| quotes.iter().map(move |q| (month, q.as_str())))
        .collect();
    match candidates.choose(rng) {
        Some(&(month, text)) => found(text, month, year),
        None => Resolution::NotFound(NotFound::Year(year)),
    }
}

fn found(text: &str, month: u32, year: i32) -> Resolution {
    Resolution::Found(ResolvedQuote {
        text: text.to_string(),
        month,
        year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::SearchConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn resolver() -> QuoteResolver {
        QuoteResolver::new(FuzzyMatcher::default()).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    fn single() -> QuoteDocument {
        QuoteDocument::from_value(json!({"2020": {"3": ["Quote A"]}})).unwrap()
    }

    fn sample() -> QuoteDocument {
        QuoteDocument::from_value(json!({
            "2019": {
                "11": ["Arrays start at one", "I am a humble array"],
                "12": ["Christmas is a linked list"]
            },
            "2020": {
                "3": ["Quote A", "Quote B"],
                "6": ["Summer of sorting"]
            }
        }))
        .unwrap()
    }

    fn quote(text: &str, month: u32, year: i32) -> Resolution {
        found(text, month, year)
    }

    #[test]
    fn test_end_to_end_example() {
        let doc = single();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            r.resolve(&doc, Some("March 2020"), today(), &mut rng),
            quote("Quote A", 3, 2020)
        );
        assert_eq!(
            r.resolve(&doc, Some("2021"), today(), &mut rng),
            Resolution::NotFound(NotFound::Year(2021))
        );
        assert_eq!(
            r.resolve(&doc, Some("xyz-nonmatch"), today(), &mut rng),
            Resolution::NotFound(NotFound::Query("xyz-nonmatch".to_string()))
        );
        for _ in 0..20 {
            assert_eq!(r.resolve(&doc, None, today(), &mut rng), quote("Quote A", 3, 2020));
        }
    }

    #[test]
    fn test_random_quote_comes_from_document() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let Resolution::Found(q) = r.resolve(&doc, None, today(), &mut rng) else {
                panic!("random pick must always find a quote");
            };
            assert!(doc.month(q.year, q.month).unwrap().contains(&q.text));
        }
    }

    #[test]
    fn test_random_quote_reaches_every_year() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            if let Resolution::Found(q) = r.resolve(&doc, Some("  "), today(), &mut rng) {
                seen.insert(q.year);
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_month_and_year_restrict_selection() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let Resolution::Found(q) = r.resolve(&doc, Some("november 2019"), today(), &mut rng)
            else {
                panic!("november 2019 exists");
            };
            assert_eq!((q.year, q.month), (2019, 11));
            assert!(doc.month(2019, 11).unwrap().contains(&q.text));
        }
    }

    #[test]
    fn test_month_defaults_to_current_year() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            r.resolve(&doc, Some("june"), today(), &mut rng),
            quote("Summer of sorting", 6, 2020)
        );
        let next_year = NaiveDate::from_ymd_opt(2021, 2, 1).unwrap();
        assert_eq!(
            r.resolve(&doc, Some("june"), next_year, &mut rng),
            Resolution::NotFound(NotFound::Year(2021))
        );
    }

    #[test]
    fn test_missing_month_in_present_year() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            r.resolve(&doc, Some("january 2020"), today(), &mut rng),
            Resolution::NotFound(NotFound::Month { year: 2020, month: 1 })
        );
    }

    #[test]
    fn test_missing_year_with_month() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            r.resolve(&doc, Some("march 1999"), today(), &mut rng),
            Resolution::NotFound(NotFound::Year(1999))
        );
    }

    #[test]
    fn test_year_only_spans_all_months() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(9);
        let mut months = std::collections::HashSet::new();
        for _ in 0..200 {
            let Resolution::Found(q) = r.resolve(&doc, Some("2019"), today(), &mut rng) else {
                panic!("2019 exists");
            };
            assert_eq!(q.year, 2019);
            months.insert(q.month);
        }
        assert_eq!(months.len(), 2);
    }

    #[test]
    fn test_date_without_fields_is_unresolved() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            r.resolve(&doc, Some("monday"), today(), &mut rng),
            Resolution::Unresolved
        );
    }

    #[test]
    fn test_exact_query_finds_its_quote() {
        let doc = sample();
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(5);
        for (year, month, text) in doc.entries() {
            let Resolution::Found(q) = r.resolve(&doc, Some(text), today(), &mut rng) else {
                panic!("{text:?} should match itself");
            };
            // other quotes may match too, but the exact one must be among the candidates
            let candidates: Vec<_> = doc
                .entries()
                .filter(|(_, _, t)| r.matcher.matches(text, t))
                .collect();
            assert!(candidates.contains(&(year, month, text)));
            assert!(candidates.contains(&(q.year, q.month, q.text.as_str())));
        }
    }

    #[test]
    fn test_fuzzy_query_with_typo() {
        let doc = sample();
        let strict = SearchConfig {
            threshold: 0.3,
            ..SearchConfig::default()
        };
        let r = QuoteResolver::new(FuzzyMatcher::new(&strict)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            r.resolve(&doc, Some("lnked list"), today(), &mut rng),
            quote("Christmas is a linked list", 12, 2019)
        );
    }

    #[test]
    fn test_empty_document_has_no_quotes() {
        let r = resolver();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            r.resolve(&QuoteDocument::default(), None, today(), &mut rng),
            Resolution::NotFound(NotFound::NoQuotes)
        );
    }
}
