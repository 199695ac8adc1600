//! Regular expression stage
//!
//! Matching runs against each item's string representation (`Display`), so a
//! walk entry matches on its pathname. The pattern is compiled when the first
//! entry is pulled; a bad pattern becomes an `InvalidArgument` element.

use regex::Regex;

use crate::error::SplashError;
use crate::item::{Entry, Item};
use crate::transforms::{deferred, Entries, Transform};

/// How a [`RegexFilter`] treats a matching item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegexMode {
    /// Keep items that match.
    #[default]
    Match,
    /// Keep items that match, replacing each with the text of its first match.
    GetMatch,
    /// Keep items that do not match.
    Inverse,
}

#[derive(Debug, Clone)]
pub struct RegexFilter {
    pattern: String,
    mode: RegexMode,
}

impl RegexFilter {
    pub fn new(pattern: impl Into<String>, mode: RegexMode) -> Self {
        RegexFilter {
            pattern: pattern.into(),
            mode,
        }
    }
}

fn select(re: &Regex, mode: RegexMode, entry: Entry) -> Option<Entry> {
    let text = entry.value.to_string();
    match mode {
        RegexMode::Match => re.is_match(&text).then_some(entry),
        RegexMode::Inverse => (!re.is_match(&text)).then_some(entry),
        RegexMode::GetMatch => re.find(&text).map(|found| Entry {
            key: entry.key,
            value: Item::Text(found.as_str().to_string()),
        }),
    }
}

impl Transform for RegexFilter {
    fn name(&self) -> &str {
        match self.mode {
            RegexMode::Inverse => "inverseregex",
            _ => "regex",
        }
    }

    fn apply<'a>(self: Box<Self>, upstream: Entries<'a>) -> Entries<'a> {
        let RegexFilter { pattern, mode } = *self;
        deferred(move || -> Entries<'a> {
            match Regex::new(&pattern) {
                Ok(re) => Box::new(upstream.filter_map(move |entry| match entry {
                    Ok(entry) => select(&re, mode, entry).map(Ok),
                    Err(err) => Some(Err(err)),
                })),
                Err(err) => Box::new(std::iter::once(Err(SplashError::invalid(format!(
                    "bad pattern '{}': {}",
                    pattern, err
                ))))),
            }
        })
    }
}
