//! Automation server health probing.
//!
//! The probe is two-staged so a reachable-but-foreign endpoint (say, a
//! generic web server squatting the port) yields a different diagnostic
//! than a dead one. Stage one checks plain HTTP reachability of the
//! configured URL; stage two requests the protocol status document and
//! verifies its shape. No retries, one bounded timeout, fresh verdict per
//! call.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Default bound applied to each probe request.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const BODY_SNIPPET_LEN: usize = 160;

/// Verdict of a single probe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerHealth {
	/// Nothing answered on the configured URL. Carries the low-level
	/// connection error. Timeouts land here as well: a request that never
	/// completed proves nothing about what protocol the endpoint speaks.
	Unreachable(String),
	/// Something answered, but the status document does not look like an
	/// automation server. Carries the unexpected status or body.
	WrongProtocol(String),
	Healthy,
}

/// Probe seam. The orchestrator owns a boxed instance so tests can
/// substitute scripted verdicts without a listening server.
#[async_trait]
pub trait ServerProbe: Send + Sync {
	async fn probe(&self, url: &Url) -> ServerHealth;
}

/// HTTP prober speaking to the remote automation server's status endpoint.
pub struct HttpProber {
	timeout: Duration,
}

impl HttpProber {
	pub fn new() -> Self {
		Self {
			timeout: DEFAULT_PROBE_TIMEOUT,
		}
	}

	pub fn with_timeout(timeout: Duration) -> Self {
		Self { timeout }
	}
}

impl Default for HttpProber {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ServerProbe for HttpProber {
	async fn probe(&self, url: &Url) -> ServerHealth {
		let client = match reqwest::Client::builder().timeout(self.timeout).build() {
			Ok(client) => client,
			Err(err) => return ServerHealth::Unreachable(err.to_string()),
		};

		debug!(target = "drover.probe", %url, "checking reachability");
		if let Err(err) = client.get(url.clone()).send().await {
			return ServerHealth::Unreachable(flatten_error(&err));
		}

		let Some(status_url) = status_endpoint(url) else {
			return ServerHealth::Unreachable(format!("url \"{url}\" cannot be used as an endpoint base"));
		};

		debug!(target = "drover.probe", url = %status_url, "requesting status document");
		let response = match client.get(status_url).send().await {
			Ok(response) => response,
			Err(err) => return ServerHealth::Unreachable(flatten_error(&err)),
		};

		if !response.status().is_success() {
			return ServerHealth::WrongProtocol(format!("unexpected status {}", response.status()));
		}

		let body = match response.text().await {
			Ok(body) => body,
			Err(err) => return ServerHealth::WrongProtocol(flatten_error(&err)),
		};

		if is_status_document(&body) {
			ServerHealth::Healthy
		} else {
			ServerHealth::WrongProtocol(snippet(&body))
		}
	}
}

/// A compatible server answers with `{"value": {"ready": <bool>, ...}}`.
/// Whether it is ready is irrelevant here; the shape is what proves the
/// protocol.
fn is_status_document(body: &str) -> bool {
	serde_json::from_str::<Value>(body)
		.ok()
		.and_then(|doc| doc.get("value")?.get("ready")?.as_bool())
		.is_some()
}

/// Appends `status` to the endpoint path, preserving any base path the
/// server is mounted under.
fn status_endpoint(url: &Url) -> Option<Url> {
	let mut status = url.clone();
	status.path_segments_mut().ok()?.pop_if_empty().push("status");
	Some(status)
}

/// Collapses reqwest's error chain into one line for the operator.
fn flatten_error(err: &reqwest::Error) -> String {
	use std::error::Error;

	let mut message = err.to_string();
	let mut source = err.source();
	while let Some(cause) = source {
		message = cause.to_string();
		source = cause.source();
	}
	message
}

fn snippet(body: &str) -> String {
	let trimmed = body.trim();
	if trimmed.is_empty() {
		return "empty response body".to_string();
	}
	let mut snippet: String = trimmed.chars().take(BODY_SNIPPET_LEN).collect();
	if snippet.len() < trimmed.len() {
		snippet.push_str("...");
	}
	snippet
}
