use crate::commands::install::Installer;
use crate::options::verbose;
use crate::utils::report::ConsoleReporter;
use anyhow::Result;
use colored::Colorize;

pub fn execute(installer: &Installer) -> Result<()> {
    verbose::log("Executing check command");
    println!("{}", "Checking prerequisites...".bold());

    let reporter = ConsoleReporter::new();
    installer.check_prerequisites(&reporter)
}
