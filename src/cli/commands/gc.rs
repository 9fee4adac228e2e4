//! Gc command - remove superseded versions

use super::run_blocking;
use crate::cache::layout::validate_fingerprint;
use crate::cache::Unpacker;
use crate::cli::args::GcArgs;
use crate::config::Config;
use crate::error::CacheResult;
use console::style;

/// Execute the gc command
pub async fn execute(args: GcArgs, config: &Config) -> CacheResult<()> {
    let cache_config = config.cache.clone();
    let keep = args.keep.clone();
    let all = args.all;
    let dry_run = args.dry_run;

    let (kept, report) = run_blocking(move || {
        let unpacker = Unpacker::from_config(&cache_config)?;
        let keep = match keep {
            Some(fingerprint) => {
                validate_fingerprint(&fingerprint)?;
                Some(fingerprint)
            }
            None if all => None,
            None => unpacker.latest_complete()?,
        };
        let report = unpacker.sweep(keep.as_deref(), dry_run);
        Ok((keep, report))
    })
    .await?;

    if let Some(ref fingerprint) = kept {
        println!("  {} {} (kept)", style("•").green(), fingerprint);
    }

    for path in &report.protected {
        println!("  {} {} (protected)", style("•").dim(), path.display());
    }
    for path in &report.busy {
        println!("  {} {} (unpack in progress)", style("•").yellow(), path.display());
    }
    for (path, reason) in &report.failed {
        println!("  {} {}: {}", style("✗").red(), path.display(), reason);
    }

    if report.removed.is_empty() {
        println!("No expired versions.");
        return Ok(());
    }

    for path in &report.removed {
        println!("  {} {}", style("•").red(), path.display());
    }
    println!();

    if dry_run {
        println!("Dry run - {} version(s) would be removed.", report.removed.len());
    } else {
        println!(
            "{} removed {} version(s)",
            style("✓").green(),
            report.removed.len()
        );
    }

    Ok(())
}
