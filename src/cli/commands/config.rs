//! Config command

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::CacheResult;
use crate::ui::{self, UiContext};

/// Execute the config command
///
/// `show` prints the effective configuration, `--root`/`--app` overrides
/// included.
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> CacheResult<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => print!("{}", toml::to_string_pretty(config)?),
        ConfigAction::Path => println!("{}", manager.path().display()),
        ConfigAction::Init { force } => {
            let ctx = UiContext::detect();
            let path = manager.path().display().to_string();
            if manager.init(force).await? {
                ui::step_ok_detail(&ctx, "Wrote default configuration", &path);
            } else {
                ui::step_warn_hint(
                    &ctx,
                    &format!("{} already exists", path),
                    "pass --force to overwrite",
                );
            }
        }
    }
    Ok(())
}
