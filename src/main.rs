mod commands;
mod config;
mod error;
mod options;
mod platform;
mod utils;

use clap::Parser;
use colored::Colorize;
use commands::install::Installer;
use config::{InstallConfig, Settings};
use options::{Commands, SettingsArgs};

fn main() -> anyhow::Result<()> {
    let cli = options::Cli::parse();

    options::verbose::set_verbose(cli.verbose);

    if cli.verbose && cli.version {
        println!("Verbose mode: {}", "enabled".green());
        options::version::show();
        return Ok(());
    }

    if cli.version {
        options::version::show();
        return Ok(());
    }

    // No subcommand: run the whole installation with default settings.
    let command = cli.command.unwrap_or(Commands::Install {
        fix: false,
        settings: SettingsArgs::default(),
    });

    match command {
        Commands::Install { fix, settings } => {
            let installer = Installer::new(resolve(settings)?)?.with_remediation(fix);
            commands::install::execute(&installer)?;
        }
        Commands::Wizard { settings } => {
            commands::wizard::execute(Installer::new(resolve(settings)?)?)?;
        }
        Commands::Check { fix, settings } => {
            let installer = Installer::new(resolve(settings)?)?.with_remediation(fix);
            commands::check::execute(&installer)?;
        }
        Commands::Env { settings } => {
            commands::env::execute(&Installer::new(resolve(settings)?)?)?;
        }
        Commands::Info { settings } => {
            commands::info::execute(&resolve(settings)?)?;
        }
    }

    Ok(())
}

fn resolve(args: SettingsArgs) -> anyhow::Result<InstallConfig> {
    let settings = Settings::load()?.merge(args.into());
    options::verbose::log(&format!("Settings: {:?}", settings));
    InstallConfig::resolve(&settings)
}
