use colored::Colorize;
use ghops::Outcome;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Run `op` behind a spinner labelled `label`.
///
/// On success the spinner becomes a green check mark followed by the
/// outcome's own message, or `done` when it has none. On failure it becomes
/// a red cross followed by the failure message.
pub fn step<T>(label: String, done: String, op: impl FnOnce() -> Outcome<T>) -> Outcome<T> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(style("\x1b[33m{spinner}\x1b[0m {wide_msg}").tick_strings(TICKS));
    pb.set_message(label);
    pb.enable_steady_tick(Duration::from_millis(80));

    let outcome = op();
    match &outcome {
        Outcome::Success { message, .. } => {
            pb.set_style(style("\x1b[32m✔\x1b[0m {wide_msg}"));
            pb.finish_with_message(message.clone().unwrap_or(done));
        }
        Outcome::Failure { message } => {
            pb.set_style(style("\x1b[31m✘\x1b[0m {wide_msg}"));
            pb.finish_with_message(message.red().to_string());
        }
    }
    outcome
}
