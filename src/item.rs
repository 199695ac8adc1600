//! Values flowing through a pipeline
//!
//! Every element of a sequence is an [`Entry`]: a [`Key`] naming its position
//! and an [`Item`] holding the value. Literal values pushed into a chain are
//! keyed by their index in the chain's source list; directory walks key their
//! entries by pathname.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A single value in a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Int(i64),
    Text(String),
    Path(PathBuf),
    /// A directory entry produced by a walk.
    File(FileInfo),
}

impl Item {
    /// Interpret this item as a filesystem path.
    ///
    /// Text, path and file items qualify; integers do not.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Item::Text(text) => Some(Path::new(text)),
            Item::Path(path) => Some(path),
            Item::File(info) => Some(&info.path),
            Item::Int(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileInfo> {
        match self {
            Item::File(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Int(n) => write!(f, "{}", n),
            Item::Text(text) => write!(f, "{}", text),
            Item::Path(path) => write!(f, "{}", path.display()),
            Item::File(info) => write!(f, "{}", info.path.display()),
        }
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Int(n)
    }
}

impl From<i32> for Item {
    fn from(n: i32) -> Self {
        Item::Int(n as i64)
    }
}

impl From<usize> for Item {
    fn from(n: usize) -> Self {
        Item::Int(n as i64)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Text(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Text(s)
    }
}

impl From<PathBuf> for Item {
    fn from(path: PathBuf) -> Self {
        Item::Path(path)
    }
}

impl From<&Path> for Item {
    fn from(path: &Path) -> Self {
        Item::Path(path.to_path_buf())
    }
}

impl From<FileInfo> for Item {
    fn from(info: FileInfo) -> Self {
        Item::File(info)
    }
}

/// Position key of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    /// Read a value as a key.
    ///
    /// Text made only of decimal digits becomes an index, so `"3"` and `3`
    /// name the same position. Negative integers have no key form.
    pub fn from_item(item: &Item) -> Option<Key> {
        match item {
            Item::Int(n) => usize::try_from(*n).ok().map(Key::Index),
            Item::Text(text) => Some(match text.parse::<usize>() {
                Ok(index) if text.bytes().all(|b| b.is_ascii_digit()) => Key::Index(index),
                _ => Key::Name(text.clone()),
            }),
            Item::Path(path) => Some(Key::Name(path.to_string_lossy().into_owned())),
            Item::File(info) => Some(Key::Name(info.path.to_string_lossy().into_owned())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

/// One element of a lazy sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: Item,
}

impl Entry {
    pub fn new(key: impl Into<Key>, value: impl Into<Item>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// What kind of filesystem object a walk entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// Description of a directory entry found by a walk
///
/// Identity is the path alone: the same file reached from two overlapping
/// roots compares equal even though its depth differs.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub kind: FileKind,
    /// Distance from the walk root (direct children are at depth 1).
    pub depth: usize,
}

impl FileInfo {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }
}

impl PartialEq for FileInfo {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileInfo {}

impl Hash for FileInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}
