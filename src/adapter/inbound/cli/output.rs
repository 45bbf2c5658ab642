//! Terminal output for the CLI.
//!
//! Human output is colored and indented under section titles. `--json`
//! turns every line into `{"type": ..., "payload": ...}` on stdout (errors go
//! to stderr). `--quiet` keeps only warnings and errors.

use std::fmt::Display;

use owo_colors::OwoColorize;
use parking_lot::{const_rwlock, RwLock};
use serde_json::{json, Value};

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    /// Number of `-v` flags.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static CONFIG: RwLock<OutputConfig> = const_rwlock(OutputConfig::new(false, false, 0));

/// Apply the global CLI flags.
pub fn configure(config: OutputConfig) {
    *CONFIG.write() = config;
}

fn current() -> OutputConfig {
    *CONFIG.read()
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn verbosity() -> u8 {
    current().verbose
}

/// How a line behaves under `--quiet`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Weight {
    Regular,
    Important,
}

/// Print one line, as JSON or through `human`.
fn emit(kind: &str, weight: Weight, payload: Value, human: impl FnOnce()) {
    let config = current();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": payload }));
    } else if weight == Weight::Important || !config.quiet {
        human();
    }
}

/// Application name and version.
pub fn header(version: &str) {
    emit(
        "header",
        Weight::Regular,
        json!({ "app": "interview-bot", "version": version }),
        || println!("{} {}", "interview-bot".bold(), version.dimmed()),
    );
}

pub fn section(title: &str) {
    emit("section", Weight::Regular, json!({ "title": title }), || {
        println!("\n{}", title.bold());
    });
}

/// A labelled value, aligned under the section title.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        Weight::Regular,
        json!({ "label": label, "value": value }),
        || println!("  {:<14} {value}", label.dimmed()),
    );
}

pub fn success(message: &str) {
    emit("success", Weight::Regular, json!({ "message": message }), || {
        println!("  {} {message}", "✓".green());
    });
}

pub fn warning(message: &str) {
    emit("warning", Weight::Important, json!({ "message": message }), || {
        println!("  {} {message}", "⚠".yellow());
    });
}

pub fn note(message: &str) {
    emit("note", Weight::Regular, json!({ "message": message }), || {
        println!("  {}", message.dimmed());
    });
}

pub fn hint(message: &str) {
    emit("hint", Weight::Regular, json!({ "message": message }), || {
        println!("  {}: {}", "hint".cyan(), message.dimmed());
    });
}

/// Errors always go to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
    } else {
        eprintln!("  {} {message}", "×".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_replaces_flags() {
        configure(OutputConfig::new(true, false, 2));
        assert!(is_json());
        assert_eq!(verbosity(), 2);

        configure(OutputConfig::default());
        assert!(!is_json());
        assert_eq!(verbosity(), 0);
    }
}
