//! Layered configuration for the splash CLI.
//!
//! `defaults/splash.default.toml` is embedded into the binary. On top of it
//! sits at most one user file, located by [`UserConfig`]: the `--config` flag,
//! else `$SPLASH_CONFIG`, else `splash.toml` in the working directory (only
//! that last one may be absent). CLI flags land last as single-key overrides.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::error::{Result, SplashError};
use crate::registry::TransformRegistry;
use crate::transforms::BuiltinTransform;
use crate::walk::WalkFlags;

const DEFAULT_TOML: &str = include_str!("../defaults/splash.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SplashConfig {
    pub walk: WalkConfig,
    /// Extra stage names mapped to built-in transform names.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalkConfig {
    pub recursive: bool,
    pub follow_symlinks: bool,
    pub skip_hidden: bool,
    pub current_as_pathname: bool,
}

impl WalkConfig {
    pub fn flags(&self) -> WalkFlags {
        let mut flags = WalkFlags::empty();
        flags.set(WalkFlags::FOLLOW_SYMLINKS, self.follow_symlinks);
        flags.set(WalkFlags::SKIP_HIDDEN, self.skip_hidden);
        flags.set(WalkFlags::CURRENT_AS_PATHNAME, self.current_as_pathname);
        flags
    }
}

impl SplashConfig {
    /// Register every alias. An alias naming no built-in is rejected.
    pub fn apply_aliases(&self, registry: &mut TransformRegistry) -> Result<()> {
        for (name, target) in &self.aliases {
            let builtin: BuiltinTransform = target.parse().map_err(|_| {
                SplashError::invalid(format!(
                    "alias '{}' points at unknown transform '{}'",
                    name, target
                ))
            })?;
            registry.alias(name, builtin);
        }
        Ok(())
    }
}

/// Environment variable naming a user configuration file.
pub const CONFIG_ENV: &str = "SPLASH_CONFIG";

/// File picked up from the working directory when no other file is named.
pub const LOCAL_CONFIG: &str = "splash.toml";

/// Where the user's configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserConfig {
    /// Named explicitly (flag or environment); must exist.
    Explicit(PathBuf),
    /// Found by convention; skipped when absent.
    Local(PathBuf),
}

impl UserConfig {
    /// Pick the user file: an explicit path wins, then `$SPLASH_CONFIG`,
    /// then `splash.toml` in `dir`.
    pub fn resolve(explicit: Option<&Path>, env: Option<OsString>, dir: &Path) -> Self {
        if let Some(path) = explicit {
            return UserConfig::Explicit(path.to_path_buf());
        }
        match env {
            Some(value) if !value.is_empty() => UserConfig::Explicit(PathBuf::from(value)),
            _ => UserConfig::Local(dir.join(LOCAL_CONFIG)),
        }
    }

    /// Resolve against the process environment and working directory.
    pub fn from_env(explicit: Option<&Path>) -> Self {
        let dir = env::current_dir().unwrap_or_default();
        Self::resolve(explicit, env::var_os(CONFIG_ENV), &dir)
    }

    pub fn path(&self) -> &Path {
        match self {
            UserConfig::Explicit(path) | UserConfig::Local(path) => path,
        }
    }
}

/// Layers the user file and CLI overrides over the embedded defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file, failing at `build` if `required` and the file is missing.
    fn with_source(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_source(path.as_ref(), true)
    }

    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_source(path.as_ref(), false)
    }

    /// Layer the user's file as located by [`UserConfig`].
    pub fn with_user_config(self, user: &UserConfig) -> Self {
        let required = matches!(user, UserConfig::Explicit(_));
        tracing::debug!(path = %user.path().display(), required, "config.user");
        self.with_source(user.path(), required)
    }

    /// Override one key, e.g. `walk.recursive` from `--shallow`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SplashConfig> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<SplashConfig> {
    Loader::new().build()
}
