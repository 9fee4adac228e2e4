//! List command - show unpacked versions

use super::run_blocking;
use crate::cache::{Unpacker, VersionEntry, VersionState};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::CacheResult;
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> CacheResult<()> {
    let cache_config = config.cache.clone();
    let versions =
        run_blocking(move || Unpacker::from_config(&cache_config)?.list_versions()).await?;

    if versions.is_empty() {
        if matches!(args.format, OutputFormat::Json) {
            println!("[]");
        } else {
            println!("No unpacked versions found.");
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_version_table(&versions),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&versions)?),
        OutputFormat::Plain => print_version_plain(&versions),
    }

    Ok(())
}

fn print_version_table(versions: &[VersionEntry]) {
    println!(
        "{:<20} {:<30} {:<12} {:<20}",
        "FINGERPRINT", "ARCHIVE", "STATE", "COMPLETED"
    );
    println!("{}", "-".repeat(84));

    for version in versions {
        let state_display = match version.state {
            VersionState::Complete => style("complete").green().to_string(),
            VersionState::Incomplete => style("incomplete").yellow().to_string(),
        };
        let completed = version
            .completed_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let fingerprint = if version.protected {
            format!("{} (protected)", short(&version.fingerprint))
        } else {
            short(&version.fingerprint).to_string()
        };

        println!(
            "{:<20} {:<30} {:<12} {:<20}",
            fingerprint, version.archive_name, state_display, completed
        );
    }

    println!();
    println!("Total: {} version(s)", versions.len());
}

fn print_version_plain(versions: &[VersionEntry]) {
    for version in versions {
        println!("{}", version.unpack_dir.display());
    }
}

/// First 12 characters of a fingerprint
fn short(fingerprint: &str) -> &str {
    fingerprint
        .char_indices()
        .nth(12)
        .map(|(i, _)| &fingerprint[..i])
        .unwrap_or(fingerprint)
}
