//! Deduplication stage

use std::collections::HashSet;

use crate::transforms::{Entries, Transform};

/// Yields each distinct value once, keeping the first occurrence.
///
/// The seen-set lives inside the returned iterator and grows with the number
/// of distinct upstream values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unique;

impl Transform for Unique {
    fn name(&self) -> &str {
        "unique"
    }

    fn apply<'a>(self: Box<Self>, upstream: Entries<'a>) -> Entries<'a> {
        let mut seen = HashSet::new();
        Box::new(upstream.filter(move |entry| match entry {
            Ok(entry) => seen.insert(entry.value.clone()),
            Err(_) => true,
        }))
    }
}
