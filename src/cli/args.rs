//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// plugin-cache - Content-addressed unpack cache for plugin packages
///
/// Extracts downloaded plugin archives once per content hash, reuses
/// earlier extractions and sweeps superseded versions.
#[derive(Parser, Debug)]
#[command(name = "plugin-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PLUGIN_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides config)
    #[arg(long, global = true, env = "PLUGIN_CACHE_ROOT")]
    pub root: Option<PathBuf>,

    /// Application name (overrides config)
    #[arg(long, global = true)]
    pub app: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Unpack a plugin archive, reusing an earlier unpack when possible
    Unpack(UnpackArgs),

    /// Check whether a plugin archive is already unpacked
    Status(StatusArgs),

    /// List unpacked versions
    List(ListArgs),

    /// Remove superseded versions
    Gc(GcArgs),

    /// Remove every unpacked version of the application
    Clear(ClearArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the unpack command
#[derive(Parser, Debug)]
pub struct UnpackArgs {
    /// Plugin archive (zip)
    pub archive: PathBuf,

    /// Precomputed content hash of the archive (computed if omitted)
    #[arg(long)]
    pub hash: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Plugin archive (zip)
    pub archive: PathBuf,

    /// Precomputed content hash of the archive (computed if omitted)
    #[arg(long)]
    pub hash: Option<String>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the gc command
#[derive(Parser, Debug)]
pub struct GcArgs {
    /// Fingerprint to keep (default: the most recently completed version)
    #[arg(long, conflicts_with = "all")]
    pub keep: Option<String>,

    /// Remove every unprotected version, the newest one included
    #[arg(long)]
    pub all: bool,

    /// Dry run - show what would be removed
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_unpack() {
        let cli = Cli::parse_from(["plugin-cache", "unpack", "plugin.zip", "--hash", "abc"]);
        match cli.command {
            Commands::Unpack(args) => {
                assert_eq!(args.archive, PathBuf::from("plugin.zip"));
                assert_eq!(args.hash.as_deref(), Some("abc"));
                assert!(matches!(args.format, OutputFormat::Table));
            }
            _ => panic!("expected Unpack command"),
        }
    }

    #[test]
    fn cli_parses_global_overrides() {
        let cli = Cli::parse_from([
            "plugin-cache",
            "list",
            "--root",
            "/tmp/cache",
            "--app",
            "host",
            "-f",
            "json",
        ]);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/cache")));
        assert_eq!(cli.app.as_deref(), Some("host"));
        match cli.command {
            Commands::List(args) => assert!(matches!(args.format, OutputFormat::Json)),
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn cli_parses_gc() {
        let cli = Cli::parse_from(["plugin-cache", "gc", "--keep", "abc", "--dry-run"]);
        match cli.command {
            Commands::Gc(args) => {
                assert_eq!(args.keep.as_deref(), Some("abc"));
                assert!(args.dry_run);
            }
            _ => panic!("expected Gc command"),
        }
    }

    #[test]
    fn cli_gc_keep_conflicts_with_all() {
        let cli = Cli::parse_from(["plugin-cache", "gc", "--all"]);
        match cli.command {
            Commands::Gc(args) => assert!(args.all && args.keep.is_none()),
            _ => panic!("expected Gc command"),
        }
        assert!(Cli::try_parse_from(["plugin-cache", "gc", "--all", "--keep", "abc"]).is_err());
    }

    #[test]
    fn cli_unpack_requires_archive() {
        assert!(Cli::try_parse_from(["plugin-cache", "unpack"]).is_err());
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["plugin-cache", "list"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["plugin-cache", "-v", "list"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["plugin-cache", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }
}
