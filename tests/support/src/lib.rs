//! test-support: shared helpers for the gh-productivity-report test suites.
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! ```rust
//! use test_support::{init_tracing, fixture_path};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _dataset = fixture_path("dataset.json");
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::{env, path::{Path, PathBuf}};

/// Prefix shared by every fixture-backend environment variable.
pub const GITHUB_FIXTURE_PREFIX: &str = "GHP_TEST_";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,gh_productivity_report=info"));
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Initialize insta settings once per test process (omit `Expression:` headers).
pub fn init_insta() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let mut settings = insta::Settings::clone_current();
        settings.set_omit_expression(true);
        settings.set_sort_maps(true);
        let guard = settings.bind_to_scope();
        std::mem::forget(guard);
    });
    Lazy::force(&INIT);
}

/// The repository's `tests/fixtures` directory.
///
/// This crate lives in `<repo>/tests/support`, so the fixtures sit next to it.
pub fn fixtures_dir() -> PathBuf {
    let support = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    support.parent().map(Path::to_path_buf).unwrap_or(support).join("fixtures")
}

/// Absolute path of a fixture, for passing to the CLI.
pub fn fixture_path<P: AsRef<Path>>(rel_path: P) -> PathBuf {
    fixtures_dir().join(rel_path)
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixture_path(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Deserialize a JSON fixture into `T` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_fixture_json<T, P>(rel_path: P) -> T
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = fixture_path(rel_path);
    let file = std::fs::File::open(&path)
        .unwrap_or_else(|e| panic!("failed to open fixture {}: {e}", path.display()));
    serde_json::from_reader::<_, T>(file)
        .unwrap_or_else(|e| panic!("failed to parse JSON fixture {}: {e}", path.display()))
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
    EnvGuard::set_many(vars)
}

/// Install GitHub fixture payloads (`GHP_TEST_*`) and hide real tokens until the guard drops.
///
/// Keys are given without the prefix, e.g. `("COMMITS_JSON", "[...]")`.
#[cfg(feature = "serde")]
pub fn with_github_fixtures(payloads: &[(&str, serde_json::Value)]) -> EnvGuard {
    let mut guard = EnvGuard::unset_many(&["GITHUB_TOKEN", "GH_TOKEN"]);
    for (key, value) in payloads {
        guard.set(&format!("{GITHUB_FIXTURE_PREFIX}{key}"), &value.to_string());
    }
    guard
}

/// Ready-to-run `assert_cmd` command for a binary target of this package.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    let mut cmd = assert_cmd::Command::cargo_bin(bin).expect("binary target not found");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Guard for temporarily setting or removing environment variables.
pub struct EnvGuard {
    prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set_many(kv: &[(&str, &str)]) -> Self {
        let mut guard = Self { prev: Vec::with_capacity(kv.len()) };
        for (k, v) in kv {
            guard.set(k, v);
        }
        guard
    }

    pub fn unset_many(keys: &[&str]) -> Self {
        let mut guard = Self { prev: Vec::with_capacity(keys.len()) };
        for k in keys {
            guard.remember(k);
            env::remove_var(k);
        }
        guard
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.remember(key);
        env::set_var(key, value);
    }

    fn remember(&mut self, key: &str) {
        self.prev.push((key.to_string(), env::var(key).ok()));
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // restore in reverse so repeated keys end at their original value
        for (k, old) in self.prev.drain(..).rev() {
            match old {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}
