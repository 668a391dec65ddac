//! Layered configuration for a mining run.
//!
//! Sources in priority order, highest wins:
//! 1. Command-line flags that were actually given
//! 2. Environment variables (`PMD_HISTORY_*` prefix)
//! 3. `.pmd-history.toml` in the current directory
//! 4. Built-in defaults
//!
//! Figment maps `PMD_HISTORY_MAX_COMMITS` -> `max_commits`,
//! `PMD_HISTORY_PMD_VERSION` -> `pmd_version`, etc.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::analyzer::PmdOptions;
use crate::error::{AppError, Result};
use crate::git::SurveyOptions;
use crate::git::survey::default_exclude_dirs;

pub const CONFIG_FILE: &str = ".pmd-history.toml";
pub const ENV_PREFIX: &str = "PMD_HISTORY_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MinerConfig {
    pub output_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_commits: Option<usize>,
    pub pmd_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmd_path: Option<PathBuf>,
    pub pmd_cache_dir: PathBuf,
    pub skip_download: bool,
    pub verbose: bool,
    pub analyzer_timeout_secs: u64,
    pub source_extension: String,
    pub exclude_dirs: Vec<String>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            ruleset: None,
            max_commits: None,
            pmd_version: "7.15.0".to_string(),
            pmd_path: None,
            pmd_cache_dir: PathBuf::from("./pmd"),
            skip_download: false,
            verbose: false,
            analyzer_timeout_secs: 300,
            source_extension: "java".to_string(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

/// Values supplied on the command line. Unset fields are left out of the
/// serialized layer so they never mask lower layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_commits: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmd_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmd_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_download: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer_timeout_secs: Option<u64>,
}

impl MinerConfig {
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let config: Self = Self::figment()
            .merge(Serialized::defaults(overrides))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, project file and environment, without CLI flags.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    fn validate(&self) -> Result<()> {
        if self.ruleset.is_none() {
            return Err(AppError::from(figment::Error::from(
                "missing required setting `ruleset`".to_string(),
            )));
        }
        if self.max_commits == Some(0) {
            return Err(AppError::from(figment::Error::from(
                "`max_commits` must be a positive integer".to_string(),
            )));
        }
        Ok(())
    }

    pub fn ruleset(&self) -> Result<&Path> {
        self.ruleset
            .as_deref()
            .ok_or_else(|| AppError::Internal("ruleset not configured".to_string()))
    }

    pub fn analyzer_timeout(&self) -> Duration {
        Duration::from_secs(self.analyzer_timeout_secs)
    }

    pub fn survey_options(&self) -> SurveyOptions {
        SurveyOptions {
            extension: self.source_extension.trim_start_matches('.').to_string(),
            exclude_dirs: self.exclude_dirs.clone(),
        }
    }

    pub fn pmd_options(&self) -> PmdOptions {
        PmdOptions {
            version: self.pmd_version.clone(),
            pmd_path: self.pmd_path.clone(),
            cache_dir: self.pmd_cache_dir.clone(),
            skip_download: self.skip_download,
        }
    }
}
