use crate::error::InstallError;
use crate::platform::{Platform, PlatformKind};
use crate::utils::{self, probe};
use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SPARK_VERSION: &str = "3.4.1";
pub const DEFAULT_HADOOP_PROFILE: &str = "hadoop3";
pub const DEFAULT_MIRROR: &str = "https://archive.apache.org/dist/spark";
pub const DEFAULT_WINUTILS_URL: &str =
    "https://github.com/cdarlint/winutils/raw/master/hadoop-3.3.5/bin/winutils.exe";
pub const ARCHIVE_FILE_NAME: &str = "spark.tgz";

/// User-tunable settings. Every field is optional: the config file and the
/// command line only override what they mention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub spark_version: Option<String>,
    pub hadoop_profile: Option<String>,
    pub mirror: Option<String>,
    pub install_dir: Option<PathBuf>,
    pub profile_file: Option<PathBuf>,
    pub platform: Option<PlatformKind>,
    pub winutils_url: Option<String>,
    /// Oldest Java accepted by the prerequisite check, e.g. `11` or `17.0.2`.
    pub java_minimum: Option<String>,
}

impl Settings {
    /// Reads the settings file from the config directory, or returns defaults
    /// when there is none.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings = serde_json::from_str(&content).map_err(|e| InstallError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(settings)
    }

    /// Fields set in `overrides` win.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            spark_version: overrides.spark_version.or(self.spark_version),
            hadoop_profile: overrides.hadoop_profile.or(self.hadoop_profile),
            mirror: overrides.mirror.or(self.mirror),
            install_dir: overrides.install_dir.or(self.install_dir),
            profile_file: overrides.profile_file.or(self.profile_file),
            platform: overrides.platform.or(self.platform),
            winutils_url: overrides.winutils_url.or(self.winutils_url),
            java_minimum: overrides.java_minimum.or(self.java_minimum),
        }
    }
}

/// Everything one installer run needs, resolved up front and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct InstallConfig {
    pub platform: Platform,
    pub spark_version: Version,
    pub hadoop_profile: String,
    pub archive_url: String,
    pub install_dir: PathBuf,
    pub archive_path: PathBuf,
    pub spark_home: PathBuf,
    pub hadoop_home: Option<PathBuf>,
    pub profile_file: PathBuf,
    pub winutils_url: Option<String>,
    pub java_minimum: Option<Version>,
}

impl InstallConfig {
    pub fn resolve(settings: &Settings) -> Result<Self> {
        let home = home_dir()?;
        Self::resolve_in(settings, &home)
    }

    pub fn resolve_in(settings: &Settings, home: &Path) -> Result<Self> {
        let kind = settings.platform.unwrap_or_else(PlatformKind::detect);
        let platform = Platform::new(kind, home);

        let spark_version = utils::parse_version(
            settings
                .spark_version
                .as_deref()
                .unwrap_or(DEFAULT_SPARK_VERSION),
        )?;
        let hadoop_profile = settings
            .hadoop_profile
            .clone()
            .unwrap_or_else(|| DEFAULT_HADOOP_PROFILE.to_string());
        let mirror = settings.mirror.as_deref().unwrap_or(DEFAULT_MIRROR);
        let java_minimum = settings
            .java_minimum
            .as_deref()
            .map(parse_java_minimum)
            .transpose()?;

        let install_dir = settings
            .install_dir
            .clone()
            .unwrap_or_else(|| platform.install_root.clone());
        let profile_file = settings
            .profile_file
            .clone()
            .unwrap_or_else(|| platform.profile_file.clone());

        let archive_url = utils::get_download_url(mirror, &spark_version, &hadoop_profile);
        let archive_path = install_dir.join(ARCHIVE_FILE_NAME);
        let spark_home = install_dir.join(utils::dist_name(&spark_version, &hadoop_profile));

        let (hadoop_home, winutils_url) = if platform.needs_winutils {
            (
                Some(install_dir.join("hadoop")),
                Some(
                    settings
                        .winutils_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_WINUTILS_URL.to_string()),
                ),
            )
        } else {
            (None, None)
        };

        Ok(InstallConfig {
            platform,
            spark_version,
            hadoop_profile,
            archive_url,
            install_dir,
            archive_path,
            spark_home,
            hadoop_home,
            profile_file,
            winutils_url,
            java_minimum,
        })
    }

    pub fn spark_bin(&self) -> PathBuf {
        self.spark_home.join("bin")
    }

    pub fn winutils_path(&self) -> Option<PathBuf> {
        self.hadoop_home
            .as_ref()
            .map(|home| home.join("bin").join("winutils.exe"))
    }
}

/// Accepts the short forms Java itself reports, so `11` means 11.0.0.
fn parse_java_minimum(text: &str) -> Result<Version> {
    probe::parse_version_output(text).ok_or_else(|| {
        InstallError::InvalidVersion {
            version: text.to_string(),
        }
        .into()
    })
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "spark-installer", "spark-installer")
        .map(|dirs| dirs.config_dir().join("config.json"))
}

fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| InstallError::HomeDirectoryNotFound.into())
}
