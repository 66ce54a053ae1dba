pub mod verbose;
pub mod version;

use crate::config::Settings;
use crate::platform::PlatformKind;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short = 'V', long, action = ArgAction::SetTrue)]
    pub version: bool,

    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check prerequisites, download, extract and configure Spark
    Install {
        /// Try to install missing prerequisites instead of stopping
        #[arg(long)]
        fix: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Interactive step-by-step installation
    Wizard {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Only check that Java and Python are available
    Check {
        #[arg(long)]
        fix: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Only write SPARK_HOME and PATH to the profile file
    Env {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print the resolved installation settings
    Info {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    #[arg(long, value_enum)]
    pub platform: Option<PlatformKind>,

    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    #[arg(long)]
    pub spark_version: Option<String>,

    #[arg(long)]
    pub hadoop_profile: Option<String>,

    #[arg(long)]
    pub mirror: Option<String>,

    #[arg(long)]
    pub profile_file: Option<PathBuf>,

    /// Oldest acceptable Java version, e.g. 11
    #[arg(long)]
    pub java_minimum: Option<String>,
}

impl From<SettingsArgs> for Settings {
    fn from(args: SettingsArgs) -> Self {
        Settings {
            spark_version: args.spark_version,
            hadoop_profile: args.hadoop_profile,
            mirror: args.mirror,
            install_dir: args.install_dir,
            profile_file: args.profile_file,
            platform: args.platform,
            winutils_url: None,
            java_minimum: args.java_minimum,
        }
    }
}
