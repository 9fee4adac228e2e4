//! Status command - check whether an archive is already unpacked

use super::run_blocking;
use crate::cache::Unpacker;
use crate::cli::args::StatusArgs;
use crate::config::Config;
use crate::error::CacheResult;
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> CacheResult<()> {
    let ctx = UiContext::detect();
    let cache_config = config.cache.clone();
    let archive = args.archive.clone();
    let hash = args.hash.clone();

    let (fingerprint, unpack_dir, unpacked) = run_blocking(move || {
        let unpacker = Unpacker::from_config(&cache_config)?;
        let fingerprint = unpacker.resolve_fingerprint(hash.as_deref(), &archive)?;
        let unpack_dir = unpacker.layout().unpack_dir(&fingerprint, &archive)?;
        let unpacked = unpacker.is_unpacked(Some(fingerprint.as_str()), &archive)?;
        Ok((fingerprint, unpack_dir, unpacked))
    })
    .await?;

    ui::key_value(&ctx, "Archive", &args.archive.display().to_string());
    ui::key_value(&ctx, "Fingerprint", &fingerprint);
    ui::key_value(&ctx, "Directory", &unpack_dir.display().to_string());
    let state = if unpacked { "complete" } else { "not unpacked" };
    ui::key_value_status(&ctx, "State", state, unpacked);

    Ok(())
}
