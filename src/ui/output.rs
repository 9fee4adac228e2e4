//! Step and key/value lines
//!
//! Fancy mode goes through `cliclack::log`; plain mode prints a bracketed tag
//! so logs stay grep-able in CI.

use super::context::UiContext;
use console::{style, StyledObject};

#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Warn,
}

impl Level {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Self::Ok => style("[OK]").green(),
            Self::Warn => style("[WARN]").yellow(),
        }
    }
}

fn step(ctx: &UiContext, level: Level, message: &str, detail: Option<&str>) {
    if ctx.is_quiet() {
        return;
    }

    if ctx.use_fancy_output() {
        let line = match detail {
            Some(detail) => format!("{} ({})", message, style(detail).dim()),
            None => message.to_string(),
        };
        let _ = match level {
            Level::Ok => cliclack::log::success(line),
            Level::Warn => cliclack::log::warning(line),
        };
    } else {
        match detail {
            Some(detail) => println!("  {} {} ({})", level.tag(), message, detail),
            None => println!("  {} {}", level.tag(), message),
        }
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Level::Ok, message, None);
}

/// Success line with a dimmed detail such as a path
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Level::Ok, message, Some(detail));
}

/// Warning line with a hint on what to do about it
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Level::Warn, message, Some(hint));
}

/// `  key: value`, key dimmed on a terminal
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// `key_value` with the value colored green (`ok`) or yellow
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.use_fancy_output() {
        let value = if ok {
            style(value).green()
        } else {
            style(value).yellow()
        };
        println!("  {}: {}", style(key).dim(), value);
    } else {
        let level = if ok { Level::Ok } else { Level::Warn };
        println!("  {} {}: {}", level.tag(), key, value);
    }
}
