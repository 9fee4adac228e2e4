//! Unpack command - unpack a plugin archive through the cache

use super::run_blocking;
use crate::cache::Unpacker;
use crate::cli::args::{OutputFormat, UnpackArgs};
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use crate::metadata::PluginConfig;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the unpack command
pub async fn execute(args: UnpackArgs, config: &Config) -> CacheResult<()> {
    if !args.archive.is_file() {
        return Err(CacheError::PathNotFound(args.archive));
    }

    let ctx = UiContext::detect().with_quiet(!matches!(args.format, OutputFormat::Table));
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Unpacking {}...", args.archive.display()));

    let cache_config = config.cache.clone();
    let archive = args.archive.clone();
    let hash = args.hash.clone();
    let result = run_blocking(move || {
        Unpacker::from_config(&cache_config)?.unpack(hash.as_deref(), &archive)
    })
    .await;

    let plugin = match result {
        Ok(plugin) => plugin,
        Err(e) => {
            spinner.stop_error("Unpack failed");
            return Err(e);
        }
    };

    match args.format {
        OutputFormat::Table => {
            spinner.stop("Package ready");
            print_plugin_table(&ctx, &plugin);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plugin)?),
        OutputFormat::Plain => println!("{}", plugin.unpack_dir.display()),
    }

    Ok(())
}

fn print_plugin_table(ctx: &UiContext, plugin: &PluginConfig) {
    ui::key_value(ctx, "UUID", &plugin.uuid);
    ui::key_value(ctx, "Name", &plugin.uuid_nickname);
    ui::key_value(ctx, "Format", &plugin.version.to_string());
    ui::key_value(ctx, "Fingerprint", &plugin.fingerprint);
    ui::key_value(ctx, "Directory", &plugin.unpack_dir.display().to_string());

    if let Some(ref loader) = plugin.plugin_loader {
        ui::key_value(ctx, "Loader", &loader.apk_name);
    }
    if let Some(ref runtime) = plugin.runtime {
        ui::key_value(ctx, "Runtime", &runtime.apk_name);
    }
    for entry in &plugin.plugins {
        ui::key_value(
            ctx,
            &format!("Plugin {}", entry.part_key),
            &entry.apk_name,
        );
    }
}
