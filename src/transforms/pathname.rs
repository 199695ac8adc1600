//! Flatten walk entries to plain paths

use crate::item::Item;
use crate::transforms::{Entries, Transform};

/// Replaces every `Item::File` with `Item::Path`; other items pass unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pathname;

impl Transform for Pathname {
    fn name(&self) -> &str {
        "pathname"
    }

    fn apply<'a>(self: Box<Self>, upstream: Entries<'a>) -> Entries<'a> {
        Box::new(upstream.map(|entry| {
            entry.map(|mut entry| {
                if let Item::File(info) = entry.value {
                    entry.value = Item::Path(info.path);
                }
                entry
            })
        }))
    }
}
