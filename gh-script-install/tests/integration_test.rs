//! End-to-end tests for gh-script-install
//!
//! A shell script stands in for the external `fetch` tool. It serves modules
//! and release assets out of a fixture directory laid out like a repository,
//! verifies checksums with coreutils, and logs every invocation.

#![cfg(target_os = "linux")]

use gh_script_install::platform::Platform;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const FAKE_FETCH: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_FETCH_LOG"
dest=""
for arg in "$@"; do
  case "$arg" in
    --tag=*) tag="${arg#--tag=}" ;;
    --source-path=*) source_path="${arg#--source-path=}" ;;
    --release-asset=*) asset="${arg#--release-asset=}" ;;
    --release-asset-checksum-algo=*) algo="${arg#--release-asset-checksum-algo=}" ;;
    --release-asset-checksum=*) checksum="${arg#--release-asset-checksum=}" ;;
    --*) ;;
    *) dest="$arg" ;;
  esac
done
if [ -n "$source_path" ]; then
  if [ -d "$FAKE_REPO$source_path" ]; then
    cp -R "$FAKE_REPO$source_path/." "$dest/"
  fi
  exit 0
fi
src="$FAKE_REPO/releases/$tag/$asset"
if [ ! -f "$src" ]; then
  echo "release asset $asset not found" >&2
  exit 1
fi
if [ -n "$algo" ]; then
  actual=$("${algo}sum" "$src" | cut -d' ' -f1)
  if [ "$actual" != "$checksum" ]; then
    echo "checksum mismatch" >&2
    exit 1
  fi
fi
cp "$src" "$dest/$asset"
"#;

/// Temporary fixture repository, fake fetch tool and config file
struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let fixture = Self { root };

        let fetch = fixture.path("fetch");
        fs::write(&fetch, FAKE_FETCH).unwrap();
        fs::set_permissions(&fetch, fs::Permissions::from_mode(0o755)).unwrap();

        let config = format!(
            "[default]\nfetch_command = \"{}\"\naccess_check_timeout = 2\n",
            fetch.display()
        );
        fs::write(fixture.path("config.toml"), config).unwrap();
        fs::create_dir_all(fixture.path("repo")).unwrap();

        fixture
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    fn add_module(&self, name: &str, script: &str) {
        let dir = self.path("repo").join("modules").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("install.sh"), script).unwrap();
    }

    fn add_release_asset(&self, tag: &str, name: &str, body: &str) -> PathBuf {
        let dir = self.path("repo").join("releases").join(tag);
        fs::create_dir_all(&dir).unwrap();
        let asset = dir.join(name);
        fs::write(&asset, body).unwrap();
        asset
    }

    fn fetch_calls(&self) -> Vec<String> {
        fs::read_to_string(self.path("fetch.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_gh-script-install"))
            .arg("--config")
            .arg(self.path("config.toml"))
            .arg("--repo")
            .arg("http://127.0.0.1:1/org/repo")
            .arg("--download-dir")
            .arg(self.path("downloads"))
            .args(args)
            .env("FAKE_REPO", self.path("repo"))
            .env("FAKE_FETCH_LOG", self.path("fetch.log"))
            .env("GITHUB_OAUTH_TOKEN", "test-token")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute gh-script-install")
    }
}

fn digest(algo: &str, path: &Path) -> String {
    let output = Command::new(format!("{algo}sum")).arg(path).output().unwrap();
    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .next()
        .unwrap()
        .to_string()
}

fn asset_name(binary: &str) -> String {
    Platform::detect().qualified_binary_name(binary).unwrap()
}

#[test]
fn test_module_install_runs_script_with_version_env() {
    let fixture = Fixture::new();
    fixture.add_module(
        "fail2ban",
        "#!/bin/sh\necho \"$GH_SCRIPT_INSTALL_TAG|$GH_SCRIPT_INSTALL_BRANCH|$1\" > \"$2\"\necho installed\n",
    );
    let marker = fixture.path("marker");
    let marker_param = format!("marker={}", marker.display());

    let output = fixture.run(&[
        "--tag",
        "v1.0.0",
        "--module-name",
        "fail2ban",
        "--module-param",
        marker_param.as_str(),
    ]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert_eq!(
        fs::read_to_string(&marker).unwrap().trim(),
        "v1.0.0||--marker"
    );
    // Only the script writes to stdout
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "installed");

    let calls = fixture.fetch_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("--tag=v1.0.0"));
    assert!(calls[0].contains("--branch="));
    assert!(calls[0].contains("--source-path=/modules/fail2ban"));
}

#[test]
fn test_module_rerun_discards_stale_files() {
    let fixture = Fixture::new();
    fixture.add_module("fail2ban", "#!/bin/sh\nexit 0\n");

    let stale = fixture.path("downloads").join("fail2ban").join("stale.conf");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "from a previous run").unwrap();

    let output = fixture.run(&["--branch", "main", "--module-name", "fail2ban"]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(!stale.exists());
    assert!(fixture
        .path("downloads")
        .join("fail2ban")
        .join("install.sh")
        .exists());
}

#[test]
fn test_module_script_exit_code_is_propagated() {
    let fixture = Fixture::new();
    fixture.add_module("broken", "#!/bin/sh\nexit 3\n");

    let output = fixture.run(&["--tag", "v1.0.0", "--module-name", "broken"]);

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_missing_module_fails() {
    let fixture = Fixture::new();

    let output = fixture.run(&["--tag", "v1.0.0", "--module-name", "nope"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope"));
    assert!(stderr.contains("v1.0.0"));
}

#[test]
fn test_binary_install_with_checksum() {
    let fixture = Fixture::new();
    let asset = fixture.add_release_asset("v1.0.0", &asset_name("mytool"), "#!/bin/sh\necho hi\n");
    let checksum = digest("sha256", &asset);
    let install_dir = fixture.path("bin");

    let output = fixture.run(&[
        "--tag",
        "v1.0.0",
        "--binary-name",
        "mytool",
        "--binary-sha256-checksum",
        checksum.as_str(),
        "--binary-install-dir",
        install_dir.to_str().unwrap(),
        "--no-sudo",
    ]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let installed = install_dir.join("mytool");
    assert!(installed.is_file());
    assert!(fs::metadata(&installed).unwrap().permissions().mode() & 0o100 != 0);
    assert!(!fixture.path("downloads").join(asset_name("mytool")).exists());
}

#[test]
fn test_binary_checksum_under_wrong_algorithm_is_rejected() {
    let fixture = Fixture::new();
    let asset = fixture.add_release_asset("v1.0.0", &asset_name("mytool"), "binary");
    let sha512 = digest("sha512", &asset);
    let install_dir = fixture.path("bin");

    let output = fixture.run(&[
        "--tag",
        "v1.0.0",
        "--binary-name",
        "mytool",
        "--binary-sha256-checksum",
        sha512.as_str(),
        "--binary-install-dir",
        install_dir.to_str().unwrap(),
        "--no-sudo",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(fixture.fetch_calls().len(), 1);
    assert!(!install_dir.join("mytool").exists());
}

#[test]
fn test_validation_failures_never_fetch() {
    let fixture = Fixture::new();
    let sha = "ab".repeat(32);

    let cases: Vec<Vec<&str>> = vec![
        vec!["--tag", "v1.0.0"],
        vec!["--tag", "v1.0.0", "--module-name", "a", "--binary-name", "b"],
        vec!["--binary-name", "mytool"],
        vec![
            "--tag",
            "v1.0.0",
            "--binary-name",
            "mytool",
            "--binary-sha256-checksum",
            sha.as_str(),
            "--binary-sha512-checksum",
            sha.as_str(),
        ],
    ];

    for case in cases {
        let output = fixture.run(&case);
        assert_eq!(output.status.code(), Some(1), "{case:?}");
    }

    assert!(fixture.fetch_calls().is_empty());
}

#[test]
fn test_missing_fetch_tool() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path("config.toml"),
        "[default]\nfetch_command = \"definitely-not-a-real-tool-7f3a\"\n",
    )
    .unwrap();

    let output = fixture.run(&["--tag", "v1.0.0", "--module-name", "fail2ban"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("definitely-not-a-real-tool-7f3a"));
}

#[test]
fn test_private_repo_without_token() {
    let fixture = Fixture::new();

    let output = Command::new(env!("CARGO_BIN_EXE_gh-script-install"))
        .arg("--config")
        .arg(fixture.path("config.toml"))
        .args([
            "--repo",
            "http://127.0.0.1:1/org/private",
            "--tag",
            "v1.0.0",
            "--module-name",
            "fail2ban",
        ])
        .env("FAKE_FETCH_LOG", fixture.path("fetch.log"))
        .env_remove("GITHUB_OAUTH_TOKEN")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GITHUB_OAUTH_TOKEN"));
    assert!(fixture.fetch_calls().is_empty());
}
