use crate::options::verbose;
use crate::platform::{Platform, Remediation};
use crate::utils::report::Reporter;
use semver::Version;
use std::io;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Launches external programs. Swapped for a fake in tests.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        verbose::log(&format!("Running {} {}", program, args.join(" ")));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        verbose::log_output(program, &String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Present when the version command exits with status zero.
    Exists,
    /// Present as above, and the printed version is parsed. An older version
    /// than `minimum` is reported as outdated.
    Version { minimum: Option<Version> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Installed { version: Option<Version> },
    Outdated { found: Version, minimum: Version },
    Missing,
}

impl ToolStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ToolStatus::Installed { .. })
    }
}

/// An external runtime Spark depends on.
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: &'static str,
    /// Launchers tried in order; the first that runs successfully wins.
    pub launchers: &'static [&'static str],
    pub version_arg: &'static str,
    pub probe: Probe,
    pub package: &'static str,
    pub download_page: &'static str,
}

/// Java, optionally held to a minimum version.
pub fn java(minimum: Option<Version>) -> Tool {
    Tool {
        name: "Java",
        launchers: &["java"],
        version_arg: "-version",
        probe: Probe::Version { minimum },
        package: "openjdk-11-jdk",
        download_page: "https://adoptium.net/",
    }
}

pub fn python() -> Tool {
    Tool {
        name: "Python",
        launchers: &["python", "python3"],
        version_arg: "--version",
        probe: Probe::Exists,
        package: "python3",
        download_page: "https://www.python.org/downloads/",
    }
}

pub fn prerequisites(java_minimum: Option<&Version>) -> Vec<Tool> {
    vec![java(java_minimum.cloned()), python()]
}

impl Probe {
    pub fn check(&self, tool: &Tool, runner: &dyn CommandRunner) -> ToolStatus {
        let output = tool.launchers.iter().find_map(|launcher| {
            match runner.run(launcher, &[tool.version_arg]) {
                Ok(output) if output.success => Some(output),
                Ok(_) => {
                    verbose::log(&format!("{} exited with a failure status", launcher));
                    None
                }
                Err(e) => {
                    verbose::log(&format!("Could not launch {}: {}", launcher, e));
                    None
                }
            }
        });

        let output = match output {
            Some(output) => output,
            None => return ToolStatus::Missing,
        };

        match self {
            Probe::Exists => ToolStatus::Installed { version: None },
            Probe::Version { minimum } => {
                // java prints its version on stderr
                let text = format!("{}\n{}", output.stdout, output.stderr);
                let found = parse_version_output(&text);
                match (found, minimum) {
                    (Some(found), Some(minimum)) if found < *minimum => ToolStatus::Outdated {
                        found,
                        minimum: minimum.clone(),
                    },
                    (found, _) => ToolStatus::Installed { version: found },
                }
            }
        }
    }
}

/// Pulls a version out of output such as `openjdk version "11.0.2"`,
/// `java version "1.8.0_292"` or `Python 3.11.4`.
pub fn parse_version_output(text: &str) -> Option<Version> {
    let quoted = text.split('"').nth(1).filter(|s| starts_with_digit(s));
    let candidate = quoted.or_else(|| text.split_whitespace().find(|s| starts_with_digit(s)))?;

    let numeric: String = candidate
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut parts = numeric
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>().ok());
    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);

    Some(Version::new(major, minor, patch))
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Checks one tool and logs the outcome.
pub fn check_tool(tool: &Tool, runner: &dyn CommandRunner, reporter: &dyn Reporter) -> ToolStatus {
    let status = tool.probe.check(tool, runner);
    match &status {
        ToolStatus::Installed { version: Some(v) } => {
            reporter.success(&format!("{} is installed ({})", tool.name, v))
        }
        ToolStatus::Installed { version: None } => {
            reporter.success(&format!("{} is installed", tool.name))
        }
        ToolStatus::Outdated { found, minimum } => reporter.error(&format!(
            "{} {} is older than the required {}",
            tool.name, found, minimum
        )),
        ToolStatus::Missing => reporter.error(&format!("{} is not installed", tool.name)),
    }
    status
}

/// Best-effort fix for a missing tool. The result is logged, never verified.
pub fn remediate(
    tool: &Tool,
    platform: &Platform,
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
) {
    match platform.remediation {
        Remediation::PackageManager => {
            reporter.info(&format!("Installing {} with apt-get...", tool.package));
            let steps: [&[&str]; 2] = [&["update"], &["install", "-y", tool.package]];
            for args in steps {
                match runner.run("apt-get", args) {
                    Ok(output) if output.success => {}
                    Ok(output) => {
                        reporter.warn(&format!(
                            "apt-get {} failed: {}",
                            args.join(" "),
                            output.stderr.trim()
                        ));
                        return;
                    }
                    Err(e) => {
                        reporter.warn(&format!("Could not run apt-get: {}", e));
                        return;
                    }
                }
            }
            reporter.success(&format!("{} installation requested", tool.name));
        }
        Remediation::Browser => {
            reporter.info(&format!(
                "Opening the {} download page: {}",
                tool.name, tool.download_page
            ));
            let (program, args) = platform.open_url_command(tool.download_page);
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            if let Err(e) = runner.run(program, &args) {
                reporter.warn(&format!("Could not open a browser: {}", e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformKind;
    use crate::utils::testing::{FakeRunner, RecordingReporter};
    use std::path::Path;

    #[test]
    fn parses_common_version_banners() {
        assert_eq!(
            parse_version_output("openjdk version \"11.0.20\" 2023-07-18"),
            Some(Version::new(11, 0, 20))
        );
        assert_eq!(
            parse_version_output("java version \"1.8.0_292\""),
            Some(Version::new(1, 8, 0))
        );
        assert_eq!(
            parse_version_output("openjdk version \"17\" 2021-09-14"),
            Some(Version::new(17, 0, 0))
        );
        assert_eq!(parse_version_output("Python 3.11.4"), Some(Version::new(3, 11, 4)));
        assert_eq!(parse_version_output("no digits"), None);
    }

    #[test]
    fn absent_program_is_missing_not_an_error() {
        let tool = Tool {
            name: "Nothing",
            launchers: &["spark-installer-no-such-program-3f9a"],
            version_arg: "--version",
            probe: Probe::Exists,
            package: "nothing",
            download_page: "https://example.invalid/",
        };
        assert_eq!(tool.probe.check(&tool, &SystemRunner), ToolStatus::Missing);
    }

    #[test]
    fn non_zero_exit_is_missing() {
        let runner = FakeRunner::new().respond("java", false, "", "boom");
        assert_eq!(java(None).probe.check(&java(None), &runner), ToolStatus::Missing);
    }

    #[test]
    fn python_falls_back_to_python3() {
        let runner = FakeRunner::new().respond("python3", true, "Python 3.10.12", "");
        let status = python().probe.check(&python(), &runner);

        assert_eq!(status, ToolStatus::Installed { version: None });
        assert_eq!(runner.calls(), vec!["python --version", "python3 --version"]);
    }

    #[test]
    fn version_probe_reads_stderr_and_enforces_minimum() {
        let runner = FakeRunner::new().respond("java", true, "", "java version \"1.8.0_292\"");
        let strict = java(Some(Version::new(11, 0, 0)));

        assert_eq!(
            strict.probe.check(&strict, &runner),
            ToolStatus::Outdated {
                found: Version::new(1, 8, 0),
                minimum: Version::new(11, 0, 0),
            }
        );
        assert_eq!(
            java(None).probe.check(&java(None), &runner),
            ToolStatus::Installed {
                version: Some(Version::new(1, 8, 0))
            }
        );
    }

    #[test]
    fn linux_remediation_uses_apt_get() {
        let runner = FakeRunner::new().respond("apt-get", true, "", "");
        let platform = Platform::new(PlatformKind::Linux, Path::new("/home/ada"));
        let reporter = RecordingReporter::default();

        remediate(&java(None), &platform, &runner, &reporter);

        assert_eq!(
            runner.calls(),
            vec!["apt-get update", "apt-get install -y openjdk-11-jdk"]
        );
    }

    #[test]
    fn failed_apt_get_update_stops_remediation() {
        let runner = FakeRunner::new().respond("apt-get", false, "", "permission denied");
        let platform = Platform::new(PlatformKind::LinuxSystem, Path::new("/root"));
        let reporter = RecordingReporter::default();

        remediate(&python(), &platform, &runner, &reporter);

        assert_eq!(runner.calls(), vec!["apt-get update"]);
        assert!(reporter.text().contains("permission denied"));
    }

    #[test]
    fn mac_remediation_opens_download_page() {
        let runner = FakeRunner::new().respond("open", true, "", "");
        let platform = Platform::new(PlatformKind::Macos, Path::new("/Users/ada"));
        let reporter = RecordingReporter::default();

        remediate(&python(), &platform, &runner, &reporter);

        assert_eq!(runner.calls(), vec!["open https://www.python.org/downloads/"]);
    }
}
