use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Missing prerequisites: {}", .tools.join(", "))]
    MissingPrerequisites { tools: Vec<String> },

    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Extraction of {} failed: {source}", .path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not update environment file {}: {source}", .path.display())]
    Environment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid version '{version}'")]
    InvalidVersion { version: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Invalid configuration file {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl InstallError {
    pub fn extraction(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::Extraction {
            path: path.into(),
            source,
        }
    }

    pub fn environment(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::Environment {
            path: path.into(),
            source,
        }
    }
}
