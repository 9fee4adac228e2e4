//! Confirmation prompt

use super::context::UiContext;
use crate::error::{CacheError, CacheResult};

/// Ask a yes/no question
///
/// `--yes` answers yes. Without a terminal the question is not asked and
/// `default` is returned.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> CacheResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (--yes)", message);
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(message).initial_value(default).interact()
    })
    .await
    .map_err(|e| CacheError::Internal(format!("Prompt task failed: {}", e)))?
    .map_err(|e| CacheError::User(format!("Prompt cancelled: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yes_flag_confirms() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Remove 2 unpacked versions?", false).await.unwrap());
    }

    #[tokio::test]
    async fn non_interactive_uses_default() {
        let ctx = UiContext::non_interactive();
        assert!(!confirm(&ctx, "Remove?", false).await.unwrap());
        assert!(confirm(&ctx, "Remove?", true).await.unwrap());
    }
}
