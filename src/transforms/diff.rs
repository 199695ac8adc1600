//! Set-difference stage

use std::collections::HashSet;

use crate::item::{Item, Key};
use crate::transforms::{Entries, Transform};

/// What a [`Diff`] compares against the comparison set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Drop entries whose value appears among the comparison values.
    ///
    /// Values compare by their string form, so `"4"` removes `4`.
    #[default]
    Value,
    /// Drop entries whose key appears among the comparison keys.
    Key,
    /// Drop entries whose key appears among the comparison values.
    KeyArray,
}

/// The right-hand side of a diff: an ordered list of key/value pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pairs: Vec<(Key, Item)>,
}

impl Comparison {
    /// Values keyed by their position.
    pub fn values<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        Comparison {
            pairs: values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (Key::Index(i), value.into()))
                .collect(),
        }
    }

    /// Explicit key/value pairs.
    pub fn keyed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Item>,
    {
        Comparison {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn key_set(&self) -> HashSet<Key> {
        self.pairs.iter().map(|(key, _)| key.clone()).collect()
    }

    fn value_set(&self) -> HashSet<String> {
        self.pairs.iter().map(|(_, value)| value.to_string()).collect()
    }

    fn values_as_keys(&self) -> HashSet<Key> {
        self.pairs
            .iter()
            .filter_map(|(_, value)| Key::from_item(value))
            .collect()
    }
}

impl<T: Into<Item>> FromIterator<T> for Comparison {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Comparison::values(iter)
    }
}

/// Yields upstream entries absent from a comparison set, in upstream order
#[derive(Debug, Clone)]
pub struct Diff {
    comparison: Comparison,
    mode: DiffMode,
}

impl Diff {
    pub fn new(comparison: Comparison, mode: DiffMode) -> Self {
        Diff { comparison, mode }
    }
}

impl Transform for Diff {
    fn name(&self) -> &str {
        "diff"
    }

    fn apply<'a>(self: Box<Self>, upstream: Entries<'a>) -> Entries<'a> {
        match self.mode {
            DiffMode::Value => {
                let values = self.comparison.value_set();
                Box::new(upstream.filter(move |entry| {
                    entry
                        .as_ref()
                        .map_or(true, |entry| !values.contains(&entry.value.to_string()))
                }))
            }
            DiffMode::Key | DiffMode::KeyArray => {
                let keys = if self.mode == DiffMode::Key {
                    self.comparison.key_set()
                } else {
                    self.comparison.values_as_keys()
                };
                Box::new(upstream.filter(move |entry| {
                    entry
                        .as_ref()
                        .map_or(true, |entry| !keys.contains(&entry.key))
                }))
            }
        }
    }
}
