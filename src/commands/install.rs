use crate::config::InstallConfig;
use crate::error::InstallError;
use crate::options::verbose;
use crate::platform::ProfileSyntax;
use crate::utils::download::{self, download_file};
use crate::utils::extract;
use crate::utils::probe::{self, CommandRunner, SystemRunner};
use crate::utils::profile::{self, EnvEntry, ProfileUpdate};
use crate::utils::report::{ConsoleReporter, Reporter};
use anyhow::{Context, Result};
use colored::Colorize;
use reqwest::blocking::Client;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CheckPrerequisites,
    Download,
    InstallAuxTool,
    Extract,
    ConfigureEnvironment,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::CheckPrerequisites,
        Step::Download,
        Step::InstallAuxTool,
        Step::Extract,
        Step::ConfigureEnvironment,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Step::CheckPrerequisites => "Checking prerequisites",
            Step::Download => "Downloading Spark",
            Step::InstallAuxTool => "Installing winutils",
            Step::Extract => "Extracting Spark",
            Step::ConfigureEnvironment => "Configuring environment variables",
        }
    }
}

/// Runs the installation steps against one resolved configuration.
pub struct Installer {
    pub config: InstallConfig,
    runner: Arc<dyn CommandRunner>,
    client: Client,
    remediate: bool,
}

impl Installer {
    pub fn new(config: InstallConfig) -> Result<Self> {
        Ok(Self::with_parts(
            config,
            Arc::new(SystemRunner),
            download::http_client()?,
        ))
    }

    pub fn with_parts(config: InstallConfig, runner: Arc<dyn CommandRunner>, client: Client) -> Self {
        Self {
            config,
            runner,
            client,
            remediate: false,
        }
    }

    /// Try to fix missing prerequisites instead of failing.
    pub fn with_remediation(mut self, remediate: bool) -> Self {
        self.remediate = remediate;
        self
    }

    pub fn run_step(&self, step: Step, reporter: &dyn Reporter) -> Result<()> {
        verbose::log(&format!("Starting step {:?}", step));
        match step {
            Step::CheckPrerequisites => self.check_prerequisites(reporter),
            Step::Download => self.download(reporter).map(|_| ()),
            Step::InstallAuxTool => self.install_aux_tool(reporter),
            Step::Extract => self.extract(reporter),
            Step::ConfigureEnvironment => self.configure_environment(reporter).map(|_| ()),
        }
    }

    /// Runs every step in order, stopping at the first failure.
    pub fn run_all(&self, reporter: &dyn Reporter) -> Result<()> {
        for step in Step::ALL {
            reporter.info(&format!("\n{}...", step.title()));
            self.run_step(step, reporter)?;
        }
        Ok(())
    }

    pub fn check_prerequisites(&self, reporter: &dyn Reporter) -> Result<()> {
        let mut missing = Vec::new();

        for tool in probe::prerequisites(self.config.java_minimum.as_ref()) {
            let status = probe::check_tool(&tool, self.runner.as_ref(), reporter);
            if status.is_ok() {
                continue;
            }
            if self.remediate {
                probe::remediate(&tool, &self.config.platform, self.runner.as_ref(), reporter);
            } else {
                missing.push(tool.name.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(InstallError::MissingPrerequisites { tools: missing }.into());
        }
        reporter.success("All prerequisites are available");
        Ok(())
    }

    pub fn download(&self, reporter: &dyn Reporter) -> Result<u64> {
        reporter.info(&format!("Downloading Apache Spark {}...", self.config.spark_version));
        let bytes = download_file(
            &self.client,
            &self.config.archive_url,
            &self.config.archive_path,
            reporter,
        )?;
        reporter.success("Download complete");
        Ok(bytes)
    }

    pub fn install_aux_tool(&self, reporter: &dyn Reporter) -> Result<()> {
        let (url, target) = match (&self.config.winutils_url, self.config.winutils_path()) {
            (Some(url), Some(target)) => (url, target),
            _ => {
                reporter.info("winutils is not needed on this platform");
                return Ok(());
            }
        };

        download_file(&self.client, url, &target, reporter)
            .context("Failed to install winutils")?;
        reporter.success(&format!("winutils installed to {}", target.display()));
        Ok(())
    }

    pub fn extract(&self, reporter: &dyn Reporter) -> Result<()> {
        reporter.info(&format!(
            "Extracting {} into {}",
            self.config.archive_path.display(),
            self.config.install_dir.display()
        ));
        extract::extract_and_remove(&self.config.archive_path, &self.config.install_dir)?;
        reporter.success("Extraction complete");
        Ok(())
    }

    pub fn environment_entries(&self) -> Vec<EnvEntry> {
        let config = &self.config;
        let mut entries = vec![EnvEntry::Set {
            name: "SPARK_HOME".into(),
            value: config.spark_home.display().to_string(),
        }];
        if let Some(hadoop_home) = &config.hadoop_home {
            entries.push(EnvEntry::Set {
                name: "HADOOP_HOME".into(),
                value: hadoop_home.display().to_string(),
            });
        }

        let bin = config.spark_bin().display().to_string();
        entries.push(match config.platform.syntax {
            ProfileSyntax::Export => EnvEntry::AppendPath(bin),
            ProfileSyntax::Environment => EnvEntry::PrependPath(bin),
        });
        entries
    }

    pub fn configure_environment(&self, reporter: &dyn Reporter) -> Result<ProfileUpdate> {
        let config = &self.config;

        if config.platform.set_process_env {
            self.set_process_env();
            reporter.info("Environment variables set for the current process");
        }

        let entries = self.environment_entries();
        let update = profile::apply(&config.profile_file, &entries, config.platform.syntax)?;
        let file = config.profile_file.display();
        match update {
            ProfileUpdate::Appended => reporter.success(&format!("Environment added to {}", file)),
            ProfileUpdate::Replaced => reporter.success(&format!("Environment updated in {}", file)),
            ProfileUpdate::Unchanged => reporter.info(&format!("{} is already up to date", file)),
        }
        Ok(update)
    }

    fn set_process_env(&self) {
        let config = &self.config;
        std::env::set_var("SPARK_HOME", &config.spark_home);
        if let Some(hadoop_home) = &config.hadoop_home {
            std::env::set_var("HADOOP_HOME", hadoop_home);
        }

        let current = std::env::var("PATH").ok();
        let path = prepend_path(
            &config.spark_bin().display().to_string(),
            current.as_deref(),
            config.platform.path_separator,
        );
        std::env::set_var("PATH", path);
    }
}

/// `bin` in front of `current`; an unset or empty `current` yields `bin` alone.
fn prepend_path(bin: &str, current: Option<&str>, separator: char) -> String {
    match current {
        Some(current) if !current.is_empty() => format!("{}{}{}", bin, separator, current),
        _ => bin.to_string(),
    }
}

pub fn execute(installer: &Installer) -> Result<()> {
    let reporter = ConsoleReporter::new();
    let config = &installer.config;

    println!(
        "{}",
        format!("=== Installing Apache Spark {} ===", config.spark_version).bold()
    );
    verbose::log(&format!("Platform: {}", config.platform.kind.name()));

    if let Err(e) = installer.run_all(&reporter) {
        if let Some(InstallError::MissingPrerequisites { .. }) = e.downcast_ref::<InstallError>() {
            reporter.error("Install the missing prerequisites (or re-run with --fix) before continuing.");
        }
        return Err(e);
    }

    println!();
    println!("{}", "Installation completed successfully!".green());
    println!("Spark is installed in: {}", config.install_dir.display());
    if config.platform.syntax == ProfileSyntax::Export {
        println!(
            "To activate the changes, run: source {}",
            config.profile_file.display()
        );
    }
    Ok(())
}
