//! UI helpers for consistent CLI output
//!
//! Uses `cliclack` for spinners, prompts and step logs in interactive
//! terminals, with automatic fallback to plain output in CI and pipes.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{key_value, key_value_status, step_ok, step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;
pub use prompts::confirm;
