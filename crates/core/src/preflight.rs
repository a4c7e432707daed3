//! Filesystem preflight checks performed before any network activity.
//!
//! Validation stops at the first inaccessible path so the operator gets
//! exactly one actionable diagnostic per run.

use std::path::Path;

use tracing::debug;

use crate::config::RunConfiguration;
use crate::error::{DroverError, Result};

/// Verifies the three configured directories in fixed order: tests-dir,
/// logs-dir, fixtures-dir. The first failure wins.
pub fn verify_paths(config: &RunConfiguration) -> Result<()> {
	let checks: [(&Path, &'static str, &'static str); 3] = [
		(&config.tests_dir, "Path to directory with tests", "tests-dir"),
		(&config.logs_dir, "Path to directory with logs", "logs-dir"),
		(&config.fixtures_dir, "Base path to directory with fixture files", "fixtures-dir"),
	];

	for (path, purpose, flag) in checks {
		if !is_readable_dir(path) {
			return Err(DroverError::InaccessiblePath {
				purpose,
				path: path.to_path_buf(),
				flag,
			});
		}
		debug!(target = "drover.preflight", path = %path.display(), flag, "path accessible");
	}

	Ok(())
}

fn is_readable_dir(path: &Path) -> bool {
	std::fs::read_dir(path).is_ok()
}
