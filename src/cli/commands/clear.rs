//! Clear command - remove every unpacked version of the application

use super::run_blocking;
use crate::cache::Unpacker;
use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use crate::ui::{self, UiContext};

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> CacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let app_name = config.cache.app_name.clone();

    let cache_config = config.cache.clone();
    let versions =
        run_blocking(move || Unpacker::from_config(&cache_config)?.list_versions()).await?;
    if versions.is_empty() {
        println!("No unpacked versions to clear.");
        return Ok(());
    }

    let prompt = format!(
        "Remove {} unpacked version(s) of {}?",
        versions.len(),
        app_name
    );
    if !ui::confirm(&ctx, &prompt, false).await? {
        println!("Aborted.");
        return Ok(());
    }

    let cache_config = config.cache.clone();
    let report = run_blocking(move || Ok(Unpacker::from_config(&cache_config)?.clear_app())).await?;

    for path in &report.busy {
        ui::step_warn_hint(
            &ctx,
            &format!("Skipped {}", path.display()),
            "an unpack is in progress",
        );
    }
    if let Some((path, reason)) = report.failed.first() {
        return Err(CacheError::User(format!(
            "Failed to remove {}: {}",
            path.display(),
            reason
        )));
    }

    ui::step_ok(
        &ctx,
        &format!("Cleared {} version directory(ies)", report.removed.len()),
    );
    Ok(())
}
