//! Chains and stage views
//!
//! A [`Chain`] owns an ordered list of sources: literal items and directory
//! roots. Appending grows that list in place and returns the chain for further
//! appends. Applying a stage never touches the chain: it returns a
//! [`StageView`] that borrows the chain and wraps one transform over it.
//! Stacking another stage moves the view into the next one, so a pipeline of
//! any length is a single value.
//!
//! # Laziness
//!
//! Nothing is read, compiled or resolved while a pipeline is being built. Each
//! terminal call (`count`, `to_array`, iteration) re-derives the whole
//! sequence from the sources, and a view resolves its transform only when its
//! first entry is pulled. Breaking out of an iteration early leaves nothing
//! behind. Results from two materializations of a directory walk are only as
//! stable as the filesystem between them.
//!
//! # Examples
//!
//! ```rust,ignore
//! use splash::prelude::*;
//!
//! let chain = splash!["/srv/www"];
//! let pages = chain
//!     .recursive_directory(WalkFlags::empty())
//!     .regex(r"\.html$", RegexMode::Match);
//! for path in &pages {
//!     println!("{}", path?);
//! }
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::item::{Entry, Item, Key};
use crate::registry::{SharedRegistry, TransformFactory, TransformRegistry};
use crate::transforms::{
    deferred, filter_fn, BuiltinTransform, Comparison, DiffMode, Entries, RegexMode, StageArgs,
    Transform,
};
use crate::walk::{DirectoryWalk, WalkFlags};

/// A lazy sequence of values.
pub type Items<'a> = Box<dyn Iterator<Item = Result<Item>> + 'a>;

/// Anything that produces a lazy sequence of entries.
///
/// Terminal methods force materialization. Stage methods live on [`Stages`].
pub trait Sequence {
    /// A fresh pass over this sequence.
    fn entries(&self) -> Entries<'_>;

    /// Registry consulted when a stage is requested by name.
    fn registry(&self) -> &SharedRegistry;

    /// Values only, one at a time.
    fn items(&self) -> Items<'_> {
        Box::new(self.entries().map(|entry| entry.map(|entry| entry.value)))
    }

    /// Count every element. Stops at the first error.
    fn count(&self) -> Result<usize> {
        let mut count = 0;
        for entry in self.entries() {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    fn to_array(&self) -> Result<Vec<Item>> {
        self.items().collect()
    }

    fn to_entries(&self) -> Result<Vec<Entry>> {
        self.entries().collect()
    }
}

impl<S: Sequence + ?Sized> Sequence for &S {
    fn entries(&self) -> Entries<'_> {
        (**self).entries()
    }

    fn registry(&self) -> &SharedRegistry {
        (**self).registry()
    }
}

/// Stage methods. Each one moves its receiver into the returned
/// [`StageView`].
///
/// A `&Chain` (or `&StageView`) receiver is only borrowed, so the chain's
/// sources stay put. A `StageView` receiver is owned by the new view, which
/// lets a whole pipeline live in one binding:
///
/// ```rust,ignore
/// let sources = chain.recursive_directory(flags).regex(r"\.rs$", RegexMode::Match);
/// assert_eq!(sources.count()?, 3);
/// ```
pub trait Stages<'a>: Sequence + Sized + 'a {
    /// Apply a transform built by `factory` from `args`.
    fn stage_with(self, factory: TransformFactory, args: StageArgs) -> StageView<'a> {
        StageView::new(Box::new(self), StageSource::Factory(factory), args)
    }

    /// Apply a prototype transform, cloned for every materialization.
    fn stage<T>(self, transform: T) -> StageView<'a>
    where
        T: Transform + Clone + 'static,
    {
        let factory: TransformFactory =
            Arc::new(move |_: &StageArgs| -> Result<Box<dyn Transform>> {
                Ok(Box::new(transform.clone()))
            });
        self.stage_with(factory, StageArgs::default())
    }

    /// Apply a stage by name, resolved through the registry when pulled.
    fn apply(self, name: &str) -> StageView<'a> {
        self.apply_with(name, StageArgs::default())
    }

    fn apply_with(self, name: &str, args: StageArgs) -> StageView<'a> {
        StageView::new(Box::new(self), StageSource::Named(name.to_string()), args)
    }

    fn builtin(self, builtin: BuiltinTransform, args: StageArgs) -> StageView<'a> {
        StageView::new(Box::new(self), StageSource::Builtin(builtin), args)
    }

    fn diff(self, comparison: Comparison, mode: DiffMode) -> StageView<'a> {
        self.builtin(
            BuiltinTransform::Diff,
            StageArgs::new().comparison(comparison, mode),
        )
    }

    fn unique(self) -> StageView<'a> {
        self.builtin(BuiltinTransform::Unique, StageArgs::new())
    }

    fn regex(self, pattern: impl Into<String>, mode: RegexMode) -> StageView<'a> {
        self.builtin(
            BuiltinTransform::Regex,
            StageArgs::new().pattern(pattern).regex_mode(mode),
        )
    }

    /// Keep items that do not match; resolved through the `inverseregex` name.
    fn inverse_regex(self, pattern: impl Into<String>) -> StageView<'a> {
        self.apply_with("inverseregex", StageArgs::new().pattern(pattern))
    }

    fn recursive_directory(self, flags: WalkFlags) -> StageView<'a> {
        self.builtin(
            BuiltinTransform::RecursiveDirectory,
            StageArgs::new().walk_flags(flags),
        )
    }

    fn directory(self, flags: WalkFlags) -> StageView<'a> {
        self.builtin(BuiltinTransform::Directory, StageArgs::new().walk_flags(flags))
    }

    fn pathnames(self) -> StageView<'a> {
        self.builtin(BuiltinTransform::Pathname, StageArgs::new())
    }

    fn filter<F>(self, predicate: F) -> StageView<'a>
    where
        F: Fn(&Entry) -> bool + Send + Sync + 'static,
    {
        self.stage(filter_fn("filter", predicate))
    }
}

impl<'a, S: Sequence + ?Sized> Stages<'a> for &'a S {}

impl<'a> Stages<'a> for StageView<'a> {}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Value(Item),
    Directory {
        root: PathBuf,
        recursive: bool,
        flags: WalkFlags,
    },
}

/// An ordered list of sources plus the registry its named stages resolve in
#[derive(Debug, Clone)]
pub struct Chain {
    sources: Vec<Source>,
    registry: SharedRegistry,
}

impl Chain {
    /// An empty chain using the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(TransformRegistry::global().clone())
    }

    pub fn with_registry(registry: SharedRegistry) -> Self {
        Chain {
            sources: Vec::new(),
            registry,
        }
    }

    pub fn push(&mut self, item: impl Into<Item>) -> &mut Self {
        self.sources.push(Source::Value(item.into()));
        self
    }

    /// Push several items, in order.
    pub fn push_all<I, T>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        self.sources
            .extend(items.into_iter().map(|item| Source::Value(item.into())));
        self
    }

    /// Append every element of a container, preserving its order.
    pub fn append_array<I, T>(&mut self, container: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        self.push_all(container)
    }

    /// Append the direct children of `root`. The directory is read when pulled.
    pub fn append_directory(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        self.append_directory_with(root, false, WalkFlags::empty())
    }

    /// Append every leaf below `root`. The directory is read when pulled.
    pub fn append_recursive_directory(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        self.append_directory_with(root, true, WalkFlags::empty())
    }

    pub fn append_directory_with(
        &mut self,
        root: impl Into<PathBuf>,
        recursive: bool,
        flags: WalkFlags,
    ) -> &mut Self {
        self.sources.push(Source::Directory {
            root: root.into(),
            recursive,
            flags,
        });
        self
    }

    /// Number of sources appended so far (not the number of elements).
    pub fn len_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn clear(&mut self) -> &mut Self {
        self.sources.clear();
        self
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence for Chain {
    fn entries<'s>(&'s self) -> Entries<'s> {
        Box::new(
            self.sources
                .iter()
                .enumerate()
                .flat_map(|(index, source)| -> Entries<'s> {
                    match source {
                        Source::Value(item) => Box::new(std::iter::once(Ok(Entry {
                            key: Key::Index(index),
                            value: item.clone(),
                        }))),
                        Source::Directory {
                            root,
                            recursive,
                            flags,
                        } => Box::new(DirectoryWalk::new(root.clone(), *recursive, *flags)),
                    }
                }),
        )
    }

    fn registry(&self) -> &SharedRegistry {
        &self.registry
    }
}

/// Where a view's transform comes from
#[derive(Clone)]
enum StageSource {
    Builtin(BuiltinTransform),
    Named(String),
    Factory(TransformFactory),
}

/// One transform layered over an upstream sequence it owns
///
/// The upstream is either a borrowed `&Chain` / `&StageView` or the previous
/// view itself, so stages stack without temporaries.
pub struct StageView<'a> {
    upstream: Box<dyn Sequence + 'a>,
    source: StageSource,
    args: StageArgs,
}

impl<'a> StageView<'a> {
    fn new(upstream: Box<dyn Sequence + 'a>, source: StageSource, args: StageArgs) -> Self {
        StageView {
            upstream,
            source,
            args,
        }
    }

    /// Name of the stage as requested.
    pub fn stage_name(&self) -> &str {
        match &self.source {
            StageSource::Builtin(builtin) => builtin.as_str(),
            StageSource::Named(name) => name.as_str(),
            StageSource::Factory(_) => "custom",
        }
    }

    fn resolve(&self) -> Result<Box<dyn Transform>> {
        match &self.source {
            StageSource::Builtin(builtin) => builtin.build(&self.args),
            StageSource::Named(name) => self
                .registry()
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .resolve(name, &self.args),
            StageSource::Factory(factory) => factory(&self.args),
        }
    }
}

impl Sequence for StageView<'_> {
    fn entries<'s>(&'s self) -> Entries<'s> {
        deferred(move || -> Entries<'s> {
            match self.resolve() {
                Ok(transform) => transform.apply(self.upstream.entries()),
                Err(err) => Box::new(std::iter::once(Err(err))),
            }
        })
    }

    fn registry(&self) -> &SharedRegistry {
        self.upstream.registry()
    }
}

impl std::fmt::Debug for StageView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageView")
            .field("stage", &self.stage_name())
            .field("args", &self.args)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = Result<Item>;
    type IntoIter = Items<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

impl<'a, 'b> IntoIterator for &'a StageView<'b> {
    type Item = Result<Item>;
    type IntoIter = Items<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

/// Build a fresh chain from any list of items.
pub fn splash<I, T>(items: I) -> Chain
where
    I: IntoIterator<Item = T>,
    T: Into<Item>,
{
    let mut chain = Chain::new();
    chain.push_all(items);
    chain
}

static DEFAULT_CHAIN: Lazy<Mutex<Chain>> = Lazy::new(|| Mutex::new(Chain::new()));

/// The process-wide default chain, created on first call.
///
/// Sources pushed through the guard stay for the life of the process. The
/// guard holds the chain's lock: calling `go()` again on the same thread while
/// a guard, or a view borrowing through one, is still alive deadlocks.
pub fn go() -> MutexGuard<'static, Chain> {
    DEFAULT_CHAIN
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}
