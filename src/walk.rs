//! Directory walking
//!
//! [`DirectoryWalk`] is a lazy iterator over the entries below one root. It
//! touches the filesystem only when the first entry is pulled, so a missing or
//! unreadable root is reported as an `Err` element at that point and never
//! when the pipeline is built.
//!
//! Two shapes are supported:
//!
//! - shallow: every direct child of the root, files and directories alike
//! - recursive: depth-first descent yielding leaves only (non-directories)
//!
//! Children are visited in file-name order. Nothing is filtered by default:
//! hidden files and ignore files are walked like any other entry.

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use ignore::{DirEntry, Walk, WalkBuilder};

use crate::error::{Result, SplashError};
use crate::item::{Entry, FileInfo, FileKind, Item, Key};
use crate::transforms::{Entries, Transform};

bitflags! {
    /// Options controlling what a walk yields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WalkFlags: u32 {
        /// Yield `Item::Path` values instead of `Item::File`.
        const CURRENT_AS_PATHNAME = 1 << 0;
        /// Key entries by file name instead of full pathname.
        const KEY_AS_FILENAME = 1 << 1;
        /// Descend through symbolic links.
        const FOLLOW_SYMLINKS = 1 << 2;
        /// Skip dot-files and dot-directories.
        const SKIP_HIDDEN = 1 << 3;
    }
}

/// Lazy walk of a single root
pub struct DirectoryWalk {
    root: PathBuf,
    recursive: bool,
    flags: WalkFlags,
    walk: Option<Walk>,
}

impl DirectoryWalk {
    pub fn new(root: impl Into<PathBuf>, recursive: bool, flags: WalkFlags) -> Self {
        DirectoryWalk {
            root: root.into(),
            recursive,
            flags,
            walk: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn build_walk(root: &Path, recursive: bool, flags: WalkFlags) -> Walk {
    tracing::trace!(root = %root.display(), recursive, "walk.start");
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(flags.contains(WalkFlags::SKIP_HIDDEN))
        .follow_links(flags.contains(WalkFlags::FOLLOW_SYMLINKS))
        .max_depth(if recursive { None } else { Some(1) })
        .sort_by_file_name(|a, b| a.cmp(b));
    builder.build()
}

fn kind_of(dent: &DirEntry) -> FileKind {
    match dent.file_type() {
        Some(file_type) if file_type.is_dir() => FileKind::Dir,
        Some(file_type) if file_type.is_symlink() => FileKind::Symlink,
        Some(file_type) if file_type.is_file() => FileKind::File,
        _ => FileKind::Other,
    }
}

fn to_entry(dent: DirEntry, kind: FileKind, flags: WalkFlags) -> Entry {
    let depth = dent.depth();
    let path = dent.into_path();
    let key = if flags.contains(WalkFlags::KEY_AS_FILENAME) {
        let name = path.file_name().unwrap_or(path.as_os_str());
        Key::Name(name.to_string_lossy().into_owned())
    } else {
        Key::Name(path.to_string_lossy().into_owned())
    };
    let value = if flags.contains(WalkFlags::CURRENT_AS_PATHNAME) {
        Item::Path(path)
    } else {
        Item::File(FileInfo { path, kind, depth })
    };
    Entry { key, value }
}

impl Iterator for DirectoryWalk {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let root = &self.root;
        let (recursive, flags) = (self.recursive, self.flags);
        let walk = self
            .walk
            .get_or_insert_with(|| build_walk(root, recursive, flags));

        loop {
            match walk.next()? {
                Ok(dent) => {
                    let kind = kind_of(&dent);
                    if dent.depth() == 0 {
                        if kind == FileKind::Dir {
                            continue;
                        }
                        return Some(Err(SplashError::invalid(format!(
                            "{} is not a directory",
                            root.display()
                        ))));
                    }
                    if recursive && kind == FileKind::Dir {
                        continue;
                    }
                    return Some(Ok(to_entry(dent, kind, flags)));
                }
                Err(err) => {
                    tracing::debug!(root = %root.display(), error = %err, "walk.error");
                    return Some(Err(SplashError::Filesystem {
                        path: root.clone(),
                        source: err,
                    }));
                }
            }
        }
    }
}

/// Stage that walks every upstream item as a root path
#[derive(Debug, Clone, Copy)]
pub struct WalkTransform {
    recursive: bool,
    flags: WalkFlags,
}

impl WalkTransform {
    pub fn recursive(flags: WalkFlags) -> Self {
        WalkTransform {
            recursive: true,
            flags,
        }
    }

    pub fn shallow(flags: WalkFlags) -> Self {
        WalkTransform {
            recursive: false,
            flags,
        }
    }
}

impl Transform for WalkTransform {
    fn name(&self) -> &str {
        if self.recursive {
            "recursivedirectory"
        } else {
            "directory"
        }
    }

    fn apply<'a>(self: Box<Self>, upstream: Entries<'a>) -> Entries<'a> {
        let WalkTransform { recursive, flags } = *self;
        Box::new(upstream.flat_map(move |entry| -> Entries<'a> {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => return Box::new(std::iter::once(Err(err))),
            };
            match entry.value.as_path() {
                Some(root) => Box::new(DirectoryWalk::new(root, recursive, flags)),
                None => Box::new(std::iter::once(Err(SplashError::invalid(format!(
                    "'{}' is not a path",
                    entry.value
                ))))),
            }
        }))
    }
}
