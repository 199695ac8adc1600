//! Transform stages
//!
//! A transform consumes one upstream sequence and yields one downstream
//! sequence. Every transform is lazy: `apply` only wires iterators together,
//! and the work happens as the consumer pulls entries.
//!
//! # Architecture
//!
//! - [`Transform`] is the capability every stage implements. A fresh instance
//!   is built for every materialization, so per-iteration state (the seen-set
//!   of [`Unique`], a compiled pattern) starts over on each `count()` or
//!   `to_array()`.
//! - [`BuiltinTransform`] is the closed set of stages that ship with the crate.
//!   Names that are not found in the
//!   [`TransformRegistry`](crate::registry::TransformRegistry) are parsed as one
//!   of these.
//! - [`StageArgs`] carries the parameters a stage may need (pattern, comparison
//!   set, walk flags). Missing parameters are reported when the stage is
//!   resolved, which only happens once the pipeline is pulled.
//!
//! # Custom stages
//!
//! ```rust,ignore
//! use splash::transforms::filter_fn;
//!
//! let evens = filter_fn("evens", |entry| entry.value.to_string().ends_with(['0', '2', '4']));
//! registry.write().unwrap().register_transform("evens", evens);
//! ```

pub mod diff;
pub mod filter;
pub mod pathname;
pub mod pattern;
pub mod unique;

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SplashError};
use crate::item::Entry;
use crate::walk::{WalkFlags, WalkTransform};

pub use diff::{Comparison, Diff, DiffMode};
pub use filter::{filter_fn, FnFilter};
pub use pathname::Pathname;
pub use pattern::{RegexFilter, RegexMode};
pub use unique::Unique;

/// A lazy sequence of entries.
pub type Entries<'a> = Box<dyn Iterator<Item = Result<Entry>> + 'a>;

/// Trait for anything that can turn one lazy sequence into another
pub trait Transform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Wrap `upstream`. Implementations must not pull from `upstream` here.
    fn apply<'a>(self: Box<Self>, upstream: Entries<'a>) -> Entries<'a>;
}

/// Defer building a sequence until its first element is requested.
pub(crate) fn deferred<'a, F>(build: F) -> Entries<'a>
where
    F: FnOnce() -> Entries<'a> + 'a,
{
    let mut build = Some(build);
    let mut inner: Option<Entries<'a>> = None;
    Box::new(std::iter::from_fn(move || {
        if inner.is_none() {
            inner = build.take().map(|build| build());
        }
        inner.as_mut()?.next()
    }))
}

/// Parameters handed to a stage when it is resolved
#[derive(Debug, Clone, Default)]
pub struct StageArgs {
    pub pattern: Option<String>,
    pub regex_mode: RegexMode,
    pub comparison: Option<Comparison>,
    pub diff_mode: DiffMode,
    pub walk_flags: WalkFlags,
}

impl StageArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn regex_mode(mut self, mode: RegexMode) -> Self {
        self.regex_mode = mode;
        self
    }

    pub fn comparison(mut self, comparison: Comparison, mode: DiffMode) -> Self {
        self.comparison = Some(comparison);
        self.diff_mode = mode;
        self
    }

    pub fn walk_flags(mut self, flags: WalkFlags) -> Self {
        self.walk_flags = flags;
        self
    }

    fn require_pattern(&self, stage: BuiltinTransform) -> Result<String> {
        self.pattern
            .clone()
            .ok_or_else(|| SplashError::invalid(format!("stage '{}' needs a pattern", stage)))
    }
}

/// The stages that ship with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTransform {
    Unique,
    Diff,
    Regex,
    InverseRegex,
    RecursiveDirectory,
    Directory,
    Pathname,
}

impl BuiltinTransform {
    pub const ALL: [BuiltinTransform; 7] = [
        BuiltinTransform::Unique,
        BuiltinTransform::Diff,
        BuiltinTransform::Regex,
        BuiltinTransform::InverseRegex,
        BuiltinTransform::RecursiveDirectory,
        BuiltinTransform::Directory,
        BuiltinTransform::Pathname,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinTransform::Unique => "unique",
            BuiltinTransform::Diff => "diff",
            BuiltinTransform::Regex => "regex",
            BuiltinTransform::InverseRegex => "inverseregex",
            BuiltinTransform::RecursiveDirectory => "recursivedirectory",
            BuiltinTransform::Directory => "directory",
            BuiltinTransform::Pathname => "pathname",
        }
    }

    /// Instantiate this stage with the given parameters.
    pub fn build(&self, args: &StageArgs) -> Result<Box<dyn Transform>> {
        let transform: Box<dyn Transform> = match self {
            BuiltinTransform::Unique => Box::new(Unique),
            BuiltinTransform::Diff => {
                let comparison = args.comparison.clone().ok_or_else(|| {
                    SplashError::invalid("stage 'diff' needs a comparison set")
                })?;
                Box::new(Diff::new(comparison, args.diff_mode))
            }
            BuiltinTransform::Regex => {
                Box::new(RegexFilter::new(args.require_pattern(*self)?, args.regex_mode))
            }
            BuiltinTransform::InverseRegex => Box::new(RegexFilter::new(
                args.require_pattern(*self)?,
                RegexMode::Inverse,
            )),
            BuiltinTransform::RecursiveDirectory => {
                Box::new(WalkTransform::recursive(args.walk_flags))
            }
            BuiltinTransform::Directory => Box::new(WalkTransform::shallow(args.walk_flags)),
            BuiltinTransform::Pathname => Box::new(Pathname),
        };
        Ok(transform)
    }
}

impl fmt::Display for BuiltinTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuiltinTransform {
    type Err = SplashError;

    fn from_str(name: &str) -> Result<Self> {
        let lowered = name.to_lowercase();
        BuiltinTransform::ALL
            .iter()
            .copied()
            .find(|builtin| builtin.as_str() == lowered)
            .ok_or_else(|| SplashError::UnknownTransform(name.to_string()))
    }
}
