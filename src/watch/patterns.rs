// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;

/// Compiled "which paths matter" filter.
///
/// A path (relative to the watch root, forward slashes) is admitted when its
/// extension is one of the watched extensions and it does not match any
/// ignore pattern. Extension matching is case-insensitive; ignore patterns
/// are matched as written.
#[derive(Clone)]
pub struct WatchFilter {
    extensions: Vec<String>,
    watch_set: GlobSet,
    ignore_set: Option<GlobSet>,
}

impl fmt::Debug for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchFilter")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl WatchFilter {
    pub fn new(extensions: &[String], ignore: &[String]) -> Result<Self> {
        let watch_set = build_extension_set(extensions)
            .context("building watch globset from extensions")?;

        let ignore_set = if ignore.is_empty() {
            None
        } else {
            Some(build_globset(ignore).context("building ignore globset")?)
        };

        Ok(Self {
            extensions: extensions.to_vec(),
            watch_set,
            ignore_set,
        })
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::new(&cfg.watch().extensions, &cfg.watch().ignore)
    }

    /// Extensions this filter watches, without leading dots.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if a change to `rel_path` should count towards a restart.
    pub fn admits(&self, rel_path: &str) -> bool {
        if rel_path.is_empty() || !self.watch_set.is_match(rel_path) {
            return false;
        }
        !self.is_ignored(rel_path)
    }

    /// Returns true if `rel_path` matches the ignore set.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        match &self.ignore_set {
            Some(set) => set.is_match(rel_path),
            None => false,
        }
    }

    /// Directory variant of [`is_ignored`](Self::is_ignored): `node_modules`
    /// must be skipped by `**/node_modules/**` even though the pattern only
    /// names its contents.
    pub fn is_ignored_dir(&self, rel_dir: &str) -> bool {
        self.is_ignored(rel_dir) || self.is_ignored(&format!("{rel_dir}/"))
    }
}

fn build_extension_set(extensions: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for ext in extensions {
        let pattern = format!("**/*.{ext}");
        let glob = GlobBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("invalid extension: {ext}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
