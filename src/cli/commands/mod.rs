//! CLI command implementations

pub mod clear;
pub mod config;
pub mod gc;
pub mod list;
pub mod status;
pub mod unpack;

pub use clear::execute as clear;
pub use config::execute as config;
pub use gc::execute as gc;
pub use list::execute as list;
pub use status::execute as status;
pub use unpack::execute as unpack;

use crate::error::{CacheError, CacheResult};

/// Run blocking cache work on tokio's blocking pool
pub(crate) async fn run_blocking<T, F>(work: F) -> CacheResult<T>
where
    F: FnOnce() -> CacheResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CacheError::Internal(format!("Cache task failed: {}", e)))?
}
