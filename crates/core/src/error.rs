//! Error types shared across the crate.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DroverError>;

#[derive(Debug, thiserror::Error)]
pub enum DroverError {
	/// A required filesystem path failed preflight validation. The message
	/// names the path purpose and the CLI flag that overrides it so the
	/// operator can self-correct without reading source.
	#[error("{purpose} \"{path}\" does not exist, make sure it is accessible or define your own path using --{flag} option")]
	InaccessiblePath {
		purpose: &'static str,
		path: PathBuf,
		flag: &'static str,
	},

	#[error("assertion failed: {0}")]
	Assertion(String),

	#[error("failed to load scenario \"{path}\": {reason}")]
	Scenario { path: PathBuf, reason: String },

	#[error("driver request failed: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("unexpected driver response: {0}")]
	Protocol(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("{0}")]
	Context(String),
}
