//! Architectural Enforcement
//!
//! Source scanners shared by the integration tests in `tests/`:
//! - No sleeping in the scene engine or the terminal surface; time moves
//!   through the effects clock and the frame ticker
//! - No blocking I/O inside `async fn` bodies
//!
//! The scanners are line based. Everything from the first `#[cfg(test)]`
//! line onward is treated as test code and skipped.

use std::fs;
use std::path::{Path, PathBuf};

/// A rule broken at a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the line came from
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Calls that block the runtime thread
pub const BLOCKING_PATTERNS: &[&str] = &[
    "std::fs::",
    "std::net::",
    "std::process::Command",
    "std::thread::sleep",
    "File::open(",
    "File::create(",
];

/// Workspace root, two levels above this crate
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from("../.."))
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    walkdir::WalkDir::new(workspace_root().join(dir))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Code before the test module, with comments stripped
fn production_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
}

/// Sleep calls in production code
#[must_use]
pub fn sleep_calls(path: &Path, source: &str) -> Vec<Violation> {
    production_lines(source)
        .filter(|(_, code)| code.contains("::sleep(") || code.contains(".sleep("))
        .map(|(line, code)| Violation {
            path: path.to_path_buf(),
            line,
            text: code.trim().to_string(),
        })
        .collect()
}

/// Blocking calls inside `async fn` bodies
#[must_use]
pub fn blocking_in_async(path: &Path, source: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    // Brace depth inside the current async fn, once its body opened
    let mut depth: Option<i64> = None;

    for (line, code) in production_lines(source) {
        if depth.is_none() && code.contains("async fn ") {
            depth = Some(0);
        }
        let Some(current) = depth.as_mut() else {
            continue;
        };

        if BLOCKING_PATTERNS.iter().any(|p| code.contains(p)) {
            violations.push(Violation {
                path: path.to_path_buf(),
                line,
                text: code.trim().to_string(),
            });
        }

        let opened = code.matches('{').count();
        let closed = code.matches('}').count();
        #[allow(clippy::cast_possible_wrap)]
        {
            *current += opened as i64 - closed as i64;
        }
        let declaration = opened == 0 && closed == 0 && code.trim_end().ends_with(';');
        if *current <= 0 && (opened > 0 || closed > 0 || declaration) {
            depth = None;
        }
    }
    violations
}

/// Run `scan` over every file in `dirs`
#[must_use]
pub fn scan(dirs: &[&str], rule: fn(&Path, &str) -> Vec<Violation>) -> Vec<Violation> {
    dirs.iter()
        .flat_map(|dir| rust_files(dir))
        .filter_map(|path| fs::read_to_string(&path).ok().map(|src| rule(&path, &src)))
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_detected_outside_tests_only() {
        let source = "\
fn tick() {
    tokio::time::sleep(Duration::from_millis(10)).await; // wait
}
// std::thread::sleep in a comment
#[cfg(test)]
mod tests {
    fn helper() { std::thread::sleep(D); }
}";
        let found = sleep_calls(Path::new("a.rs"), source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_blocking_flagged_only_in_async_bodies() {
        let source = "\
fn load() -> String {
    std::fs::read_to_string(\"a\").unwrap_or_default()
}

async fn read() -> Vec<u8> {
    let bytes = std::fs::read(\"b\");
    bytes.unwrap_or_default()
}

fn after() {
    let _ = std::fs::read(\"c\");
}";
        let found = blocking_in_async(Path::new("b.rs"), source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 6);
    }

    #[test]
    fn test_workspace_root_holds_the_workspace_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
        assert!(!rust_files("conductor/core/src").is_empty());
    }
}
