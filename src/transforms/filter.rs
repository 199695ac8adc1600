//! Closure-backed filter stage

use std::fmt;
use std::sync::Arc;

use crate::item::Entry;
use crate::transforms::{Entries, Transform};

/// A filter built from a predicate; see [`filter_fn`].
pub struct FnFilter<F> {
    name: String,
    predicate: Arc<F>,
}

/// Build a named filter stage from a predicate over entries.
pub fn filter_fn<F>(name: impl Into<String>, predicate: F) -> FnFilter<F>
where
    F: Fn(&Entry) -> bool + Send + Sync + 'static,
{
    FnFilter {
        name: name.into(),
        predicate: Arc::new(predicate),
    }
}

impl<F> Clone for FnFilter<F> {
    fn clone(&self) -> Self {
        FnFilter {
            name: self.name.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter").field("name", &self.name).finish()
    }
}

impl<F> Transform for FnFilter<F>
where
    F: Fn(&Entry) -> bool + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply<'a>(self: Box<Self>, upstream: Entries<'a>) -> Entries<'a> {
        let predicate = self.predicate;
        Box::new(upstream.filter(move |entry| {
            entry
                .as_ref()
                .map_or(true, |entry| (*predicate)(entry))
        }))
    }
}
