use crate::commands::install::{Installer, Step};
use crate::options::verbose;
use crate::utils::report::{ConsoleReporter, Level, Reporter};
use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Select};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    CheckingPrerequisites,
    Downloading,
    InstallingAuxTool,
    Extracting,
    ConfiguringEnvironment,
    Finished,
}

impl WizardState {
    pub const COUNT: usize = 6;

    pub fn step(self) -> Option<Step> {
        match self {
            WizardState::CheckingPrerequisites => Some(Step::CheckPrerequisites),
            WizardState::Downloading => Some(Step::Download),
            WizardState::InstallingAuxTool => Some(Step::InstallAuxTool),
            WizardState::Extracting => Some(Step::Extract),
            WizardState::ConfiguringEnvironment => Some(Step::ConfigureEnvironment),
            WizardState::Finished => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            WizardState::CheckingPrerequisites => WizardState::Downloading,
            WizardState::Downloading => WizardState::InstallingAuxTool,
            WizardState::InstallingAuxTool => WizardState::Extracting,
            WizardState::Extracting => WizardState::ConfiguringEnvironment,
            WizardState::ConfiguringEnvironment | WizardState::Finished => WizardState::Finished,
        }
    }

    /// 1-based position, for the `[n/6]` header.
    pub fn position(self) -> usize {
        match self {
            WizardState::CheckingPrerequisites => 1,
            WizardState::Downloading => 2,
            WizardState::InstallingAuxTool => 3,
            WizardState::Extracting => 4,
            WizardState::ConfiguringEnvironment => 5,
            WizardState::Finished => 6,
        }
    }

    pub fn title(self) -> &'static str {
        self.step().map_or("Installation finished", |step| step.title())
    }
}

#[derive(Debug)]
pub enum Event {
    Log(Level, String),
    TransferStarted(u64),
    Transferred(u64),
    TransferFinished,
    Done(Result<(), String>),
}

struct ChannelReporter {
    tx: Sender<Event>,
}

// A closed channel means the wizard is gone; the step just keeps going.
impl Reporter for ChannelReporter {
    fn log(&self, level: Level, line: &str) {
        let _ = self.tx.send(Event::Log(level, line.to_string()));
    }

    fn begin_transfer(&self, total: u64) {
        let _ = self.tx.send(Event::TransferStarted(total));
    }

    fn advance(&self, bytes: u64) {
        let _ = self.tx.send(Event::Transferred(bytes));
    }

    fn finish_transfer(&self) {
        let _ = self.tx.send(Event::TransferFinished);
    }
}

/// One installation step running on its own worker thread.
pub struct BackgroundStep {
    events: Receiver<Event>,
    handle: JoinHandle<()>,
}

impl BackgroundStep {
    pub fn spawn(installer: Arc<Installer>, step: Step) -> Self {
        let (tx, events) = mpsc::channel();
        let handle = thread::spawn(move || {
            let reporter = ChannelReporter { tx };
            let outcome = installer
                .run_step(step, &reporter)
                .map_err(|e| format!("{:#}", e));
            let _ = reporter.tx.send(Event::Done(outcome));
        });

        Self { events, handle }
    }

    /// Relays the worker's events to `reporter` until it reports completion.
    pub fn wait(self, reporter: &dyn Reporter) -> Result<(), String> {
        let mut outcome = Err("step stopped without reporting a result".to_string());

        for event in self.events.iter() {
            match event {
                Event::Log(level, line) => reporter.log(level, &line),
                Event::TransferStarted(total) => reporter.begin_transfer(total),
                Event::Transferred(bytes) => reporter.advance(bytes),
                Event::TransferFinished => reporter.finish_transfer(),
                Event::Done(result) => {
                    outcome = result;
                    break;
                }
            }
        }

        if self.handle.join().is_err() {
            outcome = Err("step worker panicked".to_string());
        }
        outcome
    }
}

pub fn execute(installer: Installer) -> Result<()> {
    verbose::log("Executing wizard command");
    let installer = Arc::new(installer);
    let console = ConsoleReporter::new();
    let mut state = WizardState::CheckingPrerequisites;

    println!(
        "{}",
        format!("Apache Spark {} installer", installer.config.spark_version).bold()
    );

    loop {
        println!(
            "\n{} {}",
            format!("[{}/{}]", state.position(), WizardState::COUNT).cyan(),
            state.title().bold()
        );

        let step = match state.step() {
            Some(step) => step,
            None => {
                console.success("Apache Spark was installed successfully!");
                println!("Spark is installed in: {}", installer.config.install_dir.display());
                return Ok(());
            }
        };

        let outcome = BackgroundStep::spawn(Arc::clone(&installer), step).wait(&console);
        let forward = match &outcome {
            Ok(()) => "Next",
            Err(message) => {
                console.error(message);
                "Retry"
            }
        };

        loop {
            let choice = Select::new()
                .with_prompt("Continue?")
                .items(&[forward, "Cancel"])
                .default(0)
                .interact()?;
            if choice == 0 {
                break;
            }
            if Confirm::new()
                .with_prompt("Do you really want to cancel the installation?")
                .default(false)
                .interact()?
            {
                console.warn("Installation cancelled");
                return Ok(());
            }
        }

        if outcome.is_ok() {
            state = state.next();
        }
    }
}
