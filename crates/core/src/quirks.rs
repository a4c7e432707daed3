//! Per-browser capability and post-session adjustments.
//!
//! Some browser identities need special handling around session start.
//! Those workarounds live in an open table keyed by browser identifier so
//! a new quirk is one added entry, not another branch in the lifecycle
//! manager.

use serde_json::Value;

use crate::driver::WireCommand;

/// Adjustments applied for one browser identifier.
#[derive(Debug, Clone)]
pub struct QuirkEntry {
	/// Browser identifier this entry applies to (case-insensitive).
	pub browser: String,
	/// Extra capabilities merged into the session request.
	pub capabilities: Vec<(String, Value)>,
	/// Commands executed right after the session is created.
	pub post_create: Vec<WireCommand>,
}

/// Open table mapping browser identifier to its adjustments.
#[derive(Debug, Clone)]
pub struct QuirkTable {
	entries: Vec<QuirkEntry>,
}

impl QuirkTable {
	/// Table with the known browser workarounds.
	pub fn builtin() -> Self {
		Self {
			entries: vec![
				QuirkEntry {
					browser: "internet explorer".to_string(),
					// Clears cache, cookies, history and saved form data
					// left behind by earlier sessions on the same machine.
					capabilities: vec![("ie.ensureCleanSession".to_string(), Value::Bool(true))],
					post_create: Vec::new(),
				},
				QuirkEntry {
					browser: "phantomjs".to_string(),
					capabilities: Vec::new(),
					// The headless default viewport is unchangeable from
					// capabilities and differs between builds.
					post_create: vec![WireCommand::SetWindowRect { width: 1280, height: 1024 }],
				},
			],
		}
	}

	/// Table without any entries.
	pub fn empty() -> Self {
		Self { entries: Vec::new() }
	}

	/// Adds an entry; later entries apply after earlier ones.
	pub fn register(&mut self, entry: QuirkEntry) {
		self.entries.push(entry);
	}

	/// Entries applying to `browser`.
	pub fn for_browser<'a>(&'a self, browser: &'a str) -> impl Iterator<Item = &'a QuirkEntry> {
		self.entries.iter().filter(move |entry| entry.browser.eq_ignore_ascii_case(browser))
	}
}

impl Default for QuirkTable {
	fn default() -> Self {
		Self::builtin()
	}
}
