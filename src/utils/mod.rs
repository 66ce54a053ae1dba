pub mod download;
pub mod extract;
pub mod probe;
pub mod profile;
pub mod report;

#[cfg(test)]
pub mod testing;

use crate::error::InstallError;
use anyhow::Result;
use semver::Version;

pub fn parse_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);

    Version::parse(bare).map_err(|_| {
        InstallError::InvalidVersion {
            version: version.to_string(),
        }
        .into()
    })
}

/// Directory name of an extracted Spark distribution, e.g.
/// `spark-3.4.1-bin-hadoop3`.
pub fn dist_name(version: &Version, hadoop_profile: &str) -> String {
    format!("spark-{}-bin-{}", version, hadoop_profile)
}

pub fn get_download_url(mirror: &str, version: &Version, hadoop_profile: &str) -> String {
    format!(
        "{}/spark-{}/{}.tgz",
        mirror.trim_end_matches('/'),
        version,
        dist_name(version, hadoop_profile)
    )
}
