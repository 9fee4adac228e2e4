//! Spinner around long-running cache work

use super::context::UiContext;
use console::style;

/// Spinner on a terminal, start/finish lines otherwise, nothing when quiet
pub struct TaskSpinner {
    bar: Option<cliclack::ProgressBar>,
    ctx: UiContext,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            bar: None,
            ctx: ctx.clone(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.ctx.is_quiet() {
            return;
        }
        if self.ctx.use_fancy_output() {
            let bar = cliclack::spinner();
            bar.start(message);
            self.bar = Some(bar);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Finish with a success line
    pub fn stop(&mut self, message: &str) {
        match self.bar.take() {
            Some(bar) => bar.stop(message),
            None if self.ctx.is_quiet() => {}
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    /// Finish with a failure line
    pub fn stop_error(&mut self, message: &str) {
        match self.bar.take() {
            Some(bar) => bar.error(message),
            None if self.ctx.is_quiet() => {}
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_spinner() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Unpacking plugin.zip...");
        spinner.stop("Package ready");

        let mut failing = TaskSpinner::new(&ctx);
        failing.start("Unpacking broken.zip...");
        failing.stop_error("Unpack failed");
    }

    #[test]
    fn quiet_spinner() {
        let ctx = UiContext::non_interactive().with_quiet(true);
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Unpacking...");
        spinner.stop("Done");
        assert!(spinner.bar.is_none());
    }
}
