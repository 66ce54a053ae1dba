use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// Sink for the status lines and download progress produced by each
/// installation step. The terminal and the wizard's channel both implement it.
pub trait Reporter {
    fn log(&self, level: Level, line: &str);

    fn begin_transfer(&self, _total: u64) {}

    fn advance(&self, _bytes: u64) {}

    fn finish_transfer(&self) {}

    fn info(&self, line: &str) {
        self.log(Level::Info, line);
    }

    fn success(&self, line: &str) {
        self.log(Level::Success, line);
    }

    fn warn(&self, line: &str) {
        self.log(Level::Warning, line);
    }

    fn error(&self, line: &str) {
        self.log(Level::Error, line);
    }
}

#[derive(Default)]
pub struct ConsoleReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn format_line(level: Level, line: &str) -> String {
    match level {
        Level::Info => line.to_string(),
        Level::Success => format!("{} {}", "✓".green(), line),
        Level::Warning => format!("{} {}", "!".yellow(), line.yellow()),
        Level::Error => format!("{} {}", "✗".red(), line.red()),
    }
}

impl Reporter for ConsoleReporter {
    fn log(&self, level: Level, line: &str) {
        let text = format_line(level, line);
        match self.bar.lock() {
            Ok(guard) if guard.is_some() => {
                if let Some(bar) = guard.as_ref() {
                    bar.println(text);
                }
            }
            _ if level == Level::Error => eprintln!("{}", text),
            _ => println!("{}", text),
        }
    }

    fn begin_transfer(&self, total: u64) {
        let bar = if total > 0 {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        };

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn advance(&self, bytes: u64) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                bar.inc(bytes);
            }
        }
    }

    fn finish_transfer(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}
