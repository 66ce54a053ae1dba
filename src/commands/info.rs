use crate::config::{self, InstallConfig};
use anyhow::Result;
use colored::Colorize;

pub fn execute(install_config: &InstallConfig) -> Result<()> {
    match config::config_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} {}", path.display(), "(not present)".dimmed()),
        None => println!("Config file: {}", "unavailable".dimmed()),
    }

    println!("{}", serde_json::to_string_pretty(install_config)?);
    Ok(())
}
