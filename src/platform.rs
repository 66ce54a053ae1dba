use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The installation flavours the installer knows about. Each one fixes where
/// Spark goes and which file receives the environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformKind {
    /// `/opt/spark`, exports appended to `~/.bashrc`
    Linux,
    /// `/opt/spark`, variables written to `/etc/environment`
    LinuxSystem,
    /// `~/spark`, exports appended to `~/.bash_profile`
    Macos,
    /// `~/spark` plus winutils, process environment and `~/.bash_profile`
    Windows,
}

impl PlatformKind {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            PlatformKind::Windows
        } else if cfg!(target_os = "macos") {
            PlatformKind::Macos
        } else {
            PlatformKind::Linux
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlatformKind::Linux => "linux",
            PlatformKind::LinuxSystem => "linux-system",
            PlatformKind::Macos => "macos",
            PlatformKind::Windows => "windows",
        }
    }
}

/// Line format used when writing the profile file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileSyntax {
    /// `export NAME=value`, for shell startup files
    Export,
    /// `NAME=value`, for `/etc/environment`
    Environment,
}

/// How a missing prerequisite gets fixed when the user asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Remediation {
    PackageManager,
    Browser,
}

#[derive(Debug, Clone, Serialize)]
pub struct Platform {
    pub kind: PlatformKind,
    pub install_root: PathBuf,
    pub profile_file: PathBuf,
    pub syntax: ProfileSyntax,
    pub path_separator: char,
    pub set_process_env: bool,
    pub remediation: Remediation,
    pub needs_winutils: bool,
}

impl Platform {
    pub fn new(kind: PlatformKind, home: &Path) -> Self {
        match kind {
            PlatformKind::Linux => Platform {
                kind,
                install_root: PathBuf::from("/opt/spark"),
                profile_file: home.join(".bashrc"),
                syntax: ProfileSyntax::Export,
                path_separator: ':',
                set_process_env: false,
                remediation: Remediation::PackageManager,
                needs_winutils: false,
            },
            PlatformKind::LinuxSystem => Platform {
                kind,
                install_root: PathBuf::from("/opt/spark"),
                profile_file: PathBuf::from("/etc/environment"),
                syntax: ProfileSyntax::Environment,
                path_separator: ':',
                set_process_env: false,
                remediation: Remediation::PackageManager,
                needs_winutils: false,
            },
            PlatformKind::Macos => Platform {
                kind,
                install_root: home.join("spark"),
                profile_file: home.join(".bash_profile"),
                syntax: ProfileSyntax::Export,
                path_separator: ':',
                set_process_env: false,
                remediation: Remediation::Browser,
                needs_winutils: false,
            },
            PlatformKind::Windows => Platform {
                kind,
                install_root: home.join("spark"),
                profile_file: home.join(".bash_profile"),
                syntax: ProfileSyntax::Export,
                path_separator: ';',
                set_process_env: true,
                remediation: Remediation::Browser,
                needs_winutils: true,
            },
        }
    }

    /// Program and arguments that open `url` in the default browser.
    pub fn open_url_command(&self, url: &str) -> (&'static str, Vec<String>) {
        match self.kind {
            PlatformKind::Windows => (
                "cmd",
                vec!["/C".into(), "start".into(), String::new(), url.to_string()],
            ),
            PlatformKind::Macos => ("open", vec![url.to_string()]),
            PlatformKind::Linux | PlatformKind::LinuxSystem => {
                ("xdg-open", vec![url.to_string()])
            }
        }
    }
}
