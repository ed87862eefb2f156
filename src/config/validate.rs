// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SupervisorError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SupervisorError;

    fn try_from(mut raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        raw.watch.extensions = normalize_extensions(&raw.watch.extensions);
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.process, raw.display))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_extensions(cfg)?;
    validate_ignore_patterns(cfg)?;
    validate_delay(cfg)?;
    validate_process(cfg)?;
    Ok(())
}

/// `".JS"` and `"js"` mean the same thing; strip leading dots and lowercase.
fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(extensions.len());
    for ext in extensions {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

fn validate_extensions(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.extensions.is_empty() {
        return Err(SupervisorError::ConfigError(
            "[watch].extensions must list at least one extension".to_string(),
        ));
    }

    for ext in cfg.watch.extensions.iter() {
        if ext.is_empty() {
            return Err(SupervisorError::ConfigError(
                "[watch].extensions contains an empty entry".to_string(),
            ));
        }
        if ext.contains(['/', '\\', '*', '?', '{', '}', '[', ']', '.']) {
            return Err(SupervisorError::ConfigError(format!(
                "[watch].extensions entry '{}' must be a bare extension like \"js\"",
                ext
            )));
        }
    }
    Ok(())
}

fn validate_ignore_patterns(cfg: &RawConfigFile) -> Result<()> {
    for pat in cfg.watch.ignore.iter() {
        if let Err(e) = Glob::new(pat) {
            return Err(SupervisorError::ConfigError(format!(
                "[watch].ignore pattern '{}' is not a valid glob: {}",
                pat, e
            )));
        }
    }
    Ok(())
}

fn validate_delay(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.delay_ms == 0 {
        return Err(SupervisorError::ConfigError(
            "[watch].delay_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_process(cfg: &RawConfigFile) -> Result<()> {
    if let Some(exec) = &cfg.process.exec {
        if exec.trim().is_empty() {
            return Err(SupervisorError::ConfigError(
                "[process].exec must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}
