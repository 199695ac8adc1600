//! # splash
//!
//! Fluent, lazy pipelines over values, arrays and directory trees.
//!
//! A [`Chain`] collects sources; stage methods from the [`Stages`] trait
//! layer transforms (diff, unique, regex, directory walks) over it. Nothing
//! runs until the pipeline is consumed with `count()`, `to_array()` or plain
//! iteration.
//!
//! File Layout
//!
//! src/
//!   ├── chain        Chain, StageView, the Sequence and Stages capabilities, go()
//!   ├── registry     Name -> transform factory lookup
//!   ├── transforms   Transform capability and the built-in stages
//!   ├── walk         Lazy directory walking
//!   ├── item         Item / Key / Entry value model
//!   ├── config       Layered configuration for the CLI
//!   └── error        SplashError
//!
//! ```rust,ignore
//! use splash::prelude::*;
//!
//! let found = splash!["src", "tests"]
//!     .recursive_directory(WalkFlags::CURRENT_AS_PATHNAME)
//!     .regex(r"_test\.rs$", RegexMode::Match)
//!     .to_array()?;
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod item;
pub mod registry;
pub mod transforms;
pub mod walk;

pub use chain::{go, splash, Chain, Items, Sequence, StageView, Stages};
pub use error::{Result, SplashError};
pub use item::{Entry, FileInfo, FileKind, Item, Key};
pub use registry::{SharedRegistry, TransformFactory, TransformRegistry};
pub use transforms::{
    filter_fn, BuiltinTransform, Comparison, DiffMode, Entries, RegexMode, StageArgs, Transform,
};
pub use walk::WalkFlags;

/// Everything needed to build and consume pipelines
pub mod prelude {
    pub use crate::chain::{go, Chain, Sequence, StageView, Stages};
    pub use crate::error::{Result, SplashError};
    pub use crate::item::{Entry, Item, Key};
    pub use crate::registry::TransformRegistry;
    pub use crate::splash;
    pub use crate::transforms::{Comparison, DiffMode, RegexMode, StageArgs};
    pub use crate::walk::WalkFlags;
}

/// Build a fresh [`Chain`] holding the given items, in order.
///
/// Items may be of any type convertible into [`Item`]:
///
/// ```rust,ignore
/// let chain = splash![1, "two", std::path::PathBuf::from("three")];
/// assert_eq!(chain.count()?, 3);
/// ```
#[macro_export]
macro_rules! splash {
    () => {
        $crate::chain::Chain::new()
    };
    ($($item:expr),+ $(,)?) => {{
        let mut chain = $crate::chain::Chain::new();
        $(
            chain.push($item);
        )+
        chain
    }};
}
