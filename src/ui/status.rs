use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::icons::{CHECK, CROSS, INFO};

/// Line-oriented status output for the build and deploy workflows.
///
/// A quiet printer swallows everything, which keeps workflow tests silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusPrinter {
    quiet: bool,
}

impl StatusPrinter {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    fn print(&self, line: String) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    /// Announce a workflow step.
    pub fn step(&self, icon: &Emoji<'_, '_>, msg: &str) {
        self.print(format!("{}{}", icon, style(msg).bold()));
    }

    pub fn success(&self, msg: &str) {
        self.print(format!("{}{}", CHECK, style(msg).green()));
    }

    pub fn failure(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}{}", CROSS, style(msg).red());
        }
    }

    pub fn info(&self, msg: &str) {
        self.print(format!("{}{}", INFO, msg));
    }

    /// An indented detail line.
    pub fn detail(&self, msg: &str) {
        self.print(format!("   {}", msg));
    }

    pub fn rule(&self) {
        self.print("=".repeat(60));
    }

    pub fn blank(&self) {
        self.print(String::new());
    }

    /// A ticking spinner for long waits; hidden when quiet.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg} {elapsed:.dim}")
                .expect("progress bar template is a valid static string"),
        );
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}
