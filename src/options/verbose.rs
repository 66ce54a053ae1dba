//! The global `-v` switch. Debug lines go to stderr so they never end up in
//! the JSON printed by `info`.

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

pub fn log(message: &str) {
    if is_verbose() {
        eprintln!("{} {}", "[VERBOSE]".blue(), message);
    }
}

/// Logs captured process output line by line, tagged with the program name.
pub fn log_output(program: &str, output: &str) {
    if !is_verbose() {
        return;
    }
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        eprintln!("{} {} {}", "[VERBOSE]".blue(), format!("{}:", program).dimmed(), line);
    }
}
