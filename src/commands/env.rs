use crate::commands::install::Installer;
use crate::options::verbose;
use crate::platform::ProfileSyntax;
use crate::utils::report::ConsoleReporter;
use anyhow::Result;

pub fn execute(installer: &Installer) -> Result<()> {
    verbose::log("Executing env command");
    let config = &installer.config;

    if !config.spark_home.exists() {
        verbose::log(&format!(
            "{} does not exist yet, writing the environment anyway",
            config.spark_home.display()
        ));
    }

    let reporter = ConsoleReporter::new();
    installer.configure_environment(&reporter)?;

    if config.platform.syntax == ProfileSyntax::Export {
        println!("To activate the changes, run: source {}", config.profile_file.display());
    }
    Ok(())
}
