//! # Date Expressions
//!
//! Pulls month/year information out of free text such as "March 2020", "last month",
//! "5th of june 2019" or "2021-04". Every recognised fragment contributes the fields it
//! knows; fragments are merged left to right, later ones overriding earlier ones.
//!
//! Weekday names and clock times are recognised as dates too but carry neither a month
//! nor a year, so "monday" parses to an empty `ParsedDate` rather than `None`.

use anyhow::Result;
use chrono::{Datelike, Months, NaiveDate};
use regex::{Captures, Regex};

/// Fields known from a date expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl ParsedDate {
    fn merge(&mut self, other: &ParsedDate) {
        self.year = other.year.or(self.year);
        self.month = other.month.or(self.month);
        self.day = other.day.or(self.day);
    }

    fn from_date(date: NaiveDate) -> Self {
        Self {
            year: Some(date.year()),
            month: Some(date.month()),
            day: Some(date.day()),
        }
    }
}

#[derive(Debug)]
struct Fragment {
    start: usize,
    end: usize,
    fields: ParsedDate,
}

const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|sept|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec";

pub struct DateParser {
    iso: Regex,
    slash_full: Regex,
    slash_month_year: Regex,
    month_name: Regex,
    relative_day: Regex,
    relative_unit: Regex,
    ago: Regex,
    weekday: Regex,
    clock_word: Regex,
    clock_meridiem: Regex,
    clock_24h: Regex,
    bare_year: Regex,
}

impl DateParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            iso: Regex::new(r"\b(\d{4})-(\d{1,2})(?:-(\d{1,2}))?\b")?,
            slash_full: Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b")?,
            slash_month_year: Regex::new(r"\b(\d{1,2})/(\d{4})\b")?,
            month_name: Regex::new(&format!(
                r"(?i)\b(?:(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?)?({MONTH_NAMES})\b\.?(?:\s+(\d{{1,2}})(?:st|nd|rd|th)?\b)?(?:,?\s+(\d{{4}})\b)?"
            ))?,
            relative_day: Regex::new(r"(?i)\b(today|tonight|now|yesterday|tomorrow)\b")?,
            relative_unit: Regex::new(r"(?i)\b(this|last|next|past|previous)\s+(month|year)\b")?,
            ago: Regex::new(r"(?i)\b(\d{1,3}|a|an|one|two|three)\s+(months?|years?)\s+ago\b")?,
            weekday: Regex::new(
                r"(?i)\b(?:(?:this|last|next|on)\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
            )?,
            clock_word: Regex::new(r"(?i)\b(?:noon|midnight)\b")?,
            clock_meridiem: Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(?:am|pm)\b")?,
            clock_24h: Regex::new(r"\b(\d{1,2}):(\d{2})\b")?,
            bare_year: Regex::new(r"\b([12]\d{3})\b")?,
        })
    }

    /// Parses `text` relative to `today`. `None` means no date expression was found.
    pub fn parse(&self, text: &str, today: NaiveDate) -> Option<ParsedDate> {
        let mut fragments: Vec<Fragment> = Vec::new();

        self.collect(&self.iso, text, &mut fragments, |caps| {
            let year = number::<i32>(caps, 1)?;
            let month = valid_month(number(caps, 2)?)?;
            let day = match caps.get(3) {
                Some(_) => Some(valid_day(number(caps, 3)?)?),
                None => None,
            };
            Some(ParsedDate { year: Some(year), month: Some(month), day })
        });
        self.collect(&self.slash_full, text, &mut fragments, |caps| {
            Some(ParsedDate {
                month: Some(valid_month(number(caps, 1)?)?),
                day: Some(valid_day(number(caps, 2)?)?),
                year: Some(number(caps, 3)?),
            })
        });
        self.collect(&self.slash_month_year, text, &mut fragments, |caps| {
            Some(ParsedDate {
                month: Some(valid_month(number(caps, 1)?)?),
                year: Some(number(caps, 2)?),
                day: None,
            })
        });
        self.collect(&self.month_name, text, &mut fragments, |caps| {
            let name = caps.get(2)?.as_str().to_ascii_lowercase();
            let day = caps
                .get(1)
                .or_else(|| caps.get(3))
                .and_then(|m| m.as_str().parse().ok())
                .and_then(valid_day);
            let year = caps.get(4).and_then(|m| m.as_str().parse().ok());
            // "may" and abbreviations like "mar" are too common to stand alone
            let ambiguous = name == "may" || (name.len() <= 4 && name != "june" && name != "july");
            if ambiguous && day.is_none() && year.is_none() {
                return None;
            }
            Some(ParsedDate { year, month: Some(month_from_name(&name)?), day })
        });
        self.collect(&self.relative_day, text, &mut fragments, |caps| {
            let date = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
                "yesterday" => today.pred_opt()?,
                "tomorrow" => today.succ_opt()?,
                _ => today,
            };
            Some(ParsedDate::from_date(date))
        });
        self.collect(&self.relative_unit, text, &mut fragments, |caps| {
            let direction = caps.get(1)?.as_str().to_ascii_lowercase();
            let unit = caps.get(2)?.as_str().to_ascii_lowercase();
            let offset: i32 = match direction.as_str() {
                "this" => 0,
                "next" => 1,
                _ => -1,
            };
            if unit == "year" {
                Some(ParsedDate { year: Some(today.year() + offset), month: None, day: None })
            } else {
                let date = shift_months(today, offset)?;
                Some(ParsedDate { year: Some(date.year()), month: Some(date.month()), day: None })
            }
        });
        self.collect(&self.ago, text, &mut fragments, |caps| {
            let count: u32 = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
                "a" | "an" | "one" => 1,
                "two" => 2,
                "three" => 3,
                digits => digits.parse().ok()?,
            };
            let unit = caps.get(2)?.as_str().to_ascii_lowercase();
            if unit.starts_with("year") {
                let year = today.year().checked_sub(i32::try_from(count).ok()?)?;
                Some(ParsedDate { year: Some(year), month: None, day: None })
            } else {
                let date = today.checked_sub_months(Months::new(count))?;
                Some(ParsedDate { year: Some(date.year()), month: Some(date.month()), day: None })
            }
        });
        self.collect(&self.weekday, text, &mut fragments, |_| Some(ParsedDate::default()));
        self.collect(&self.clock_word, text, &mut fragments, |_| Some(ParsedDate::default()));
        self.collect(&self.clock_meridiem, text, &mut fragments, |caps| {
            let hour: u32 = number(caps, 1)?;
            let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
            ((1..=12).contains(&hour) && minute < 60).then(ParsedDate::default)
        });
        self.collect(&self.clock_24h, text, &mut fragments, |caps| {
            let hour: u32 = number(caps, 1)?;
            let minute: u32 = number(caps, 2)?;
            (hour < 24 && minute < 60).then(ParsedDate::default)
        });
        self.collect(&self.bare_year, text, &mut fragments, |caps| {
            Some(ParsedDate { year: Some(number(caps, 1)?), month: None, day: None })
        });

        if fragments.is_empty() {
            return None;
        }
        fragments.sort_by_key(|f| f.start);
        let mut merged = ParsedDate::default();
        for fragment in &fragments {
            merged.merge(&fragment.fields);
        }
        tracing::debug!("Parsed {} date fragment(s) from {:?}: {:?}", fragments.len(), text, merged);
        Some(merged)
    }

    /// Adds every non-overlapping match of `pattern` that `extract` accepts.
    fn collect<F>(&self, pattern: &Regex, text: &str, fragments: &mut Vec<Fragment>, extract: F)
    where
        F: Fn(&Captures) -> Option<ParsedDate>,
    {
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (start, end) = (whole.start(), whole.end());
            if fragments.iter().any(|f| start < f.end && f.start < end) {
                continue;
            }
            if let Some(fields) = extract(&caps) {
                fragments.push(Fragment { start, end, fields });
            }
        }
    }
}

fn number<T: std::str::FromStr>(caps: &Captures, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}

fn valid_month(month: u32) -> Option<u32> {
    (1..=12).contains(&month).then_some(month)
}

fn valid_day(day: u32) -> Option<u32> {
    (1..=31).contains(&day).then_some(day)
}

fn shift_months(date: NaiveDate, offset: i32) -> Option<NaiveDate> {
    let months = Months::new(offset.unsigned_abs());
    if offset < 0 {
        date.checked_sub_months(months)
    } else {
        date.checked_add_months(months)
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
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

/// Full English month name for a month number (1-12).
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn parse(text: &str) -> Option<ParsedDate> {
        DateParser::new().unwrap().parse(text, today())
    }

    fn ym(year: Option<i32>, month: Option<u32>) -> (Option<i32>, Option<u32>) {
        (year, month)
    }

    fn fields(text: &str) -> (Option<i32>, Option<u32>) {
        let parsed = parse(text).unwrap_or_else(|| panic!("expected a date in {text:?}"));
        (parsed.year, parsed.month)
    }

    #[test]
    fn test_month_and_year() {
        assert_eq!(fields("March 2020"), ym(Some(2020), Some(3)));
        assert_eq!(fields("march 5, 2020"), ym(Some(2020), Some(3)));
        assert_eq!(fields("5th of June 2019"), ym(Some(2019), Some(6)));
        assert_eq!(fields("Sept 2018"), ym(Some(2018), Some(9)));
        assert_eq!(fields("dec. 2017"), ym(Some(2017), Some(12)));
    }

    #[test]
    fn test_month_only() {
        assert_eq!(fields("october"), ym(None, Some(10)));
        assert_eq!(fields("something from february please"), ym(None, Some(2)));
        assert_eq!(fields("may 4th"), ym(None, Some(5)));
    }

    #[test]
    fn test_ambiguous_month_words_need_context() {
        assert_eq!(parse("may the force be with you"), None);
        assert_eq!(parse("march on"), Some(ParsedDate { year: None, month: Some(3), day: None }));
        assert_eq!(parse("the sun rises in the east"), None);
        assert_eq!(fields("may 2020"), ym(Some(2020), Some(5)));
    }

    #[test]
    fn test_year_only() {
        assert_eq!(fields("2021"), ym(Some(2021), None));
        assert_eq!(fields("back in 1999"), ym(Some(1999), None));
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(fields("2020-03"), ym(Some(2020), Some(3)));
        assert_eq!(fields("2020-03-17"), ym(Some(2020), Some(3)));
        assert_eq!(fields("3/17/2020"), ym(Some(2020), Some(3)));
        assert_eq!(fields("11/2019"), ym(Some(2019), Some(11)));
        // month 13 is not a month, only the year survives
        assert_eq!(fields("2020-13"), ym(Some(2020), None));
    }

    #[test]
    fn test_relative_expressions() {
        assert_eq!(fields("today"), ym(Some(2024), Some(1)));
        assert_eq!(fields("last month"), ym(Some(2023), Some(12)));
        assert_eq!(fields("next month"), ym(Some(2024), Some(2)));
        assert_eq!(fields("last year"), ym(Some(2023), None));
        assert_eq!(fields("3 months ago"), ym(Some(2023), Some(10)));
        assert_eq!(fields("a year ago"), ym(Some(2023), None));
        assert_eq!(fields("yesterday"), ym(Some(2024), Some(1)));
    }

    #[test]
    fn test_fields_merge_across_fragments() {
        assert_eq!(fields("march of last year"), ym(Some(2023), Some(3)));
        assert_eq!(fields("2019 in april"), ym(Some(2019), Some(4)));
        assert_eq!(fields("march 2020 or june 2021"), ym(Some(2021), Some(6)));
    }

    #[test]
    fn test_date_without_month_or_year() {
        assert_eq!(parse("monday"), Some(ParsedDate::default()));
        assert_eq!(parse("at 5pm"), Some(ParsedDate::default()));
        assert_eq!(parse("noon"), Some(ParsedDate::default()));
    }

    #[test]
    fn test_plain_text_is_not_a_date() {
        assert_eq!(parse("xyz-nonmatch"), None);
        assert_eq!(parse("the quick brown fox"), None);
        assert_eq!(parse("42 is the answer"), None);
    }

    #[test]
    fn test_month_name_lookup() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
    }
}
