//! Test case discovery and pattern selection.
//!
//! Cases are declarative scenario files under the tests directory. The
//! fully-qualified name of a case is its path relative to that directory
//! with separators flattened to dots, which is what selection patterns
//! match against.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::Result;

/// File suffix that marks a discoverable test case.
pub const CASE_FILE_SUFFIX: &str = ".case.yaml";

/// One discoverable test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
	/// Fully-qualified, dot-separated case name.
	pub name: String,
	/// Scenario file backing the case.
	pub path: PathBuf,
}

/// Walks `tests_dir` recursively and returns every case file, ordered by
/// fully-qualified name for a deterministic run sequence.
pub fn discover(tests_dir: &Path) -> Result<Vec<TestCase>> {
	let mut cases = Vec::new();
	walk(tests_dir, tests_dir, &mut cases)?;
	cases.sort_by(|a, b| a.name.cmp(&b.name));
	debug!(target = "drover.select", dir = %tests_dir.display(), found = cases.len(), "discovery finished");
	Ok(cases)
}

fn walk(root: &Path, dir: &Path, cases: &mut Vec<TestCase>) -> Result<()> {
	for entry in std::fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();
		if entry.file_type()?.is_dir() {
			walk(root, &path, cases)?;
		} else if let Some(name) = qualified_name(root, &path) {
			cases.push(TestCase { name, path });
		}
	}
	Ok(())
}

fn qualified_name(root: &Path, path: &Path) -> Option<String> {
	let file_name = path.file_name()?.to_str()?;
	if !file_name.ends_with(CASE_FILE_SUFFIX) {
		return None;
	}

	let relative = path.strip_prefix(root).ok()?;
	let mut segments: Vec<&str> = relative
		.parent()
		.into_iter()
		.flat_map(Path::components)
		.filter_map(|c| c.as_os_str().to_str())
		.collect();
	segments.push(file_name.strip_suffix(CASE_FILE_SUFFIX)?);
	Some(segments.join("."))
}

/// Filters `cases` by `pattern`. A pattern containing glob metacharacters
/// is matched as a glob against the fully-qualified name; anything else is
/// a plain substring match. An empty or `*` pattern selects everything.
/// An empty result is a terminal condition for the caller, not an error.
pub fn select(cases: &[TestCase], pattern: &str) -> Vec<TestCase> {
	if pattern.is_empty() || pattern == "*" {
		return cases.to_vec();
	}

	let compiled = if pattern.contains(['*', '?', '[']) {
		Pattern::new(pattern).ok()
	} else {
		None
	};

	cases
		.iter()
		.filter(|case| match &compiled {
			Some(glob) => glob.matches(&case.name),
			None => case.name.contains(pattern),
		})
		.cloned()
		.collect()
}
