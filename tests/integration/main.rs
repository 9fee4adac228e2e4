//! Integration tests for plugin-cache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const MANIFEST: &str = r#"{
        "version": 4,
        "UUID": "7f0b5a4e-0000-4000-8000-000000000001",
        "UUID_NickName": "1.0.3",
        "runtime": { "apkName": "runtime.apk" },
        "plugins": [ { "partKey": "sample-plugin", "apkName": "sample.apk" } ]
    }"#;

    /// Isolated cache root and config file for one test
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn root(&self) -> PathBuf {
            self.dir.path().join("cache")
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("plugin-cache");
            cmd.env("PLUGIN_CACHE_CONFIG", self.dir.path().join("config.toml"))
                .env("PLUGIN_CACHE_ROOT", self.root())
                .args(["--app", "demo"]);
            cmd
        }

        fn archive(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
            let path = self.dir.path().join(name);
            write_zip(&path, entries);
            path
        }

        fn package(&self, name: &str, extra: &[u8]) -> PathBuf {
            self.archive(
                name,
                &[
                    ("config.json", MANIFEST.as_bytes()),
                    ("runtime.apk", b"runtime"),
                    ("sample.apk", extra),
                ],
            )
        }
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn unpack_plain(sandbox: &Sandbox, archive: &Path) -> PathBuf {
        let output = sandbox
            .cmd()
            .args(["unpack", "-f", "plain"])
            .arg(archive)
            .output()
            .unwrap();
        assert!(output.status.success(), "{:?}", output);
        PathBuf::from(String::from_utf8(output.stdout).unwrap().trim())
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("plugin-cache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Content-addressed unpack cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("plugin-cache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("plugin-cache"));
    }

    #[test]
    fn config_path_uses_override() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("ShadowPluginManager"));
    }

    #[test]
    fn config_init_writes_file() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["config", "init"]).assert().success();
        let written = fs::read_to_string(sandbox.dir.path().join("config.toml")).unwrap();
        assert!(written.contains("lock_timeout_secs"));
    }

    #[test]
    fn unpack_extracts_package() {
        let sandbox = Sandbox::new();
        let archive = sandbox.package("plugin.zip", b"v1");

        let unpack_dir = unpack_plain(&sandbox, &archive);

        assert!(unpack_dir.starts_with(sandbox.root()));
        assert!(unpack_dir.ends_with("plugin.zip"));
        assert!(unpack_dir.join("config.json").is_file());
        assert_eq!(fs::read(unpack_dir.join("sample.apk")).unwrap(), b"v1");
    }

    #[test]
    fn unpack_json_reports_manifest() {
        let sandbox = Sandbox::new();
        let archive = sandbox.package("plugin.zip", b"v1");

        sandbox
            .cmd()
            .args(["unpack", "-f", "json"])
            .arg(&archive)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"UUID_NickName\": \"1.0.3\""))
            .stdout(predicate::str::contains("\"partKey\": \"sample-plugin\""));
    }

    #[test]
    fn unpack_is_reused() {
        let sandbox = Sandbox::new();
        let archive = sandbox.package("plugin.zip", b"v1");

        let first = unpack_plain(&sandbox, &archive);
        fs::write(first.join("scratch.txt"), "left by host").unwrap();
        let second = unpack_plain(&sandbox, &archive);

        assert_eq!(first, second);
        assert!(second.join("scratch.txt").exists());
    }

    #[test]
    fn unpack_with_explicit_hash() {
        let sandbox = Sandbox::new();
        let archive = sandbox.package("plugin.zip", b"v1");

        let output = sandbox
            .cmd()
            .args(["unpack", "-f", "plain", "--hash", "build-42"])
            .arg(&archive)
            .output()
            .unwrap();
        assert!(output.status.success());
        let dir = String::from_utf8(output.stdout).unwrap();
        assert!(dir.contains("build-42"));
    }

    #[test]
    fn new_version_sweeps_old_one() {
        let sandbox = Sandbox::new();
        let old = unpack_plain(&sandbox, &sandbox.package("old.zip", b"v1"));
        let new = unpack_plain(&sandbox, &sandbox.package("new.zip", b"v2"));

        assert!(!old.exists());
        assert!(new.exists());
    }

    #[test]
    fn status_reports_state() {
        let sandbox = Sandbox::new();
        let archive = sandbox.package("plugin.zip", b"v1");

        sandbox
            .cmd()
            .arg("status")
            .arg(&archive)
            .assert()
            .success()
            .stdout(predicate::str::contains("not unpacked"));

        unpack_plain(&sandbox, &archive);

        sandbox
            .cmd()
            .arg("status")
            .arg(&archive)
            .assert()
            .success()
            .stdout(predicate::str::contains("complete"));
    }

    #[test]
    fn list_shows_versions() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No unpacked versions"));

        let unpack_dir = unpack_plain(&sandbox, &sandbox.package("plugin.zip", b"v1"));

        sandbox
            .cmd()
            .args(["list", "-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(unpack_dir.display().to_string()));
    }

    #[test]
    fn gc_all_dry_run_keeps_files() {
        let sandbox = Sandbox::new();
        let unpack_dir = unpack_plain(&sandbox, &sandbox.package("plugin.zip", b"v1"));

        sandbox
            .cmd()
            .args(["gc", "--all", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("would be removed"));

        assert!(unpack_dir.exists());
    }

    #[test]
    fn gc_keeps_newest_complete_version_by_default() {
        let sandbox = Sandbox::new();
        let unpack_dir = unpack_plain(&sandbox, &sandbox.package("plugin.zip", b"v1"));
        let app_dir = unpack_dir.parent().unwrap().parent().unwrap().to_path_buf();
        let stale = app_dir.join("stale").join("old.zip");
        fs::create_dir_all(&stale).unwrap();

        sandbox
            .cmd()
            .arg("gc")
            .assert()
            .success()
            .stdout(predicate::str::contains("removed 1 version"));

        assert!(unpack_dir.join("config.json").is_file());
        assert!(!stale.exists());
    }

    #[test]
    fn archive_named_like_marker_fails() {
        let sandbox = Sandbox::new();
        let archive = sandbox.package("unpacked.plugin.zip", b"v1");

        sandbox
            .cmd()
            .args(["unpack"])
            .arg(&archive)
            .assert()
            .failure()
            .stderr(predicate::str::contains("reserved"));
    }

    #[test]
    fn clear_with_yes_removes_everything() {
        let sandbox = Sandbox::new();
        let unpack_dir = unpack_plain(&sandbox, &sandbox.package("plugin.zip", b"v1"));

        sandbox.cmd().args(["clear", "--yes"]).assert().success();

        assert!(!unpack_dir.exists());
    }

    #[test]
    fn missing_archive_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["unpack", "does-not-exist.zip"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn not_a_zip_fails() {
        let sandbox = Sandbox::new();
        let archive = sandbox.dir.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        sandbox
            .cmd()
            .args(["unpack"])
            .arg(&archive)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot read archive"));
    }

    #[test]
    fn traversal_entry_rejected() {
        let sandbox = Sandbox::new();
        let archive = sandbox.archive(
            "evil.zip",
            &[("config.json", MANIFEST.as_bytes()), ("../../escape.txt", b"x")],
        );

        sandbox
            .cmd()
            .args(["unpack"])
            .arg(&archive)
            .assert()
            .failure()
            .stderr(predicate::str::contains("rejected"));

        assert!(!sandbox.root().join("escape.txt").exists());
    }

    #[test]
    fn missing_apk_fails() {
        let sandbox = Sandbox::new();
        let archive = sandbox.archive("partial.zip", &[("config.json", MANIFEST.as_bytes())]);

        sandbox
            .cmd()
            .args(["unpack"])
            .arg(&archive)
            .assert()
            .failure()
            .stderr(predicate::str::contains("runtime.apk"));
    }
}
