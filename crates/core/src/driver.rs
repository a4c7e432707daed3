//! Narrow client surface over the remote automation server.
//!
//! The rest of the crate treats the server as an opaque capability set:
//! create a session, execute a raw wire command against it, destroy it.
//! `HttpDriver` is the production implementation speaking the W3C wire
//! protocol; tests substitute recording fakes through the trait.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::{DroverError, Result};

/// Session creation can wait on an actual browser start behind the server.
const SESSION_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Raw commands the lifecycle manager and the case runner need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireCommand {
	Navigate(String),
	GetTitle,
	GetPageSource,
	TakeScreenshot,
	DeleteAllCookies,
	SetWindowRect { width: u32, height: u32 },
	CloseWindow,
}

/// Opaque driver capability set used by the session lifecycle manager.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
	/// Creates a remote session with the given capabilities and returns
	/// its id.
	async fn create_session(&self, capabilities: &Value) -> Result<String>;

	/// Executes one raw command against a live session and returns the
	/// response value.
	async fn execute(&self, session_id: &str, command: WireCommand) -> Result<Value>;

	/// Terminates the session on the server.
	async fn delete_session(&self, session_id: &str) -> Result<()>;
}

/// W3C wire protocol driver over HTTP.
pub struct HttpDriver {
	base: Url,
	client: reqwest::Client,
}

impl HttpDriver {
	pub fn new(server_url: &Url) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(SESSION_REQUEST_TIMEOUT)
			.build()
			.map_err(|e| DroverError::Context(format!("failed to create HTTP client: {e}")))?;
		Ok(Self {
			base: server_url.clone(),
			client,
		})
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|_| DroverError::Context(format!("url \"{}\" cannot be used as an endpoint base", self.base)))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	async fn get(&self, segments: &[&str]) -> Result<Value> {
		let response = self.client.get(self.endpoint(segments)?).send().await?;
		unwrap_value(response).await
	}

	async fn post(&self, segments: &[&str], body: Value) -> Result<Value> {
		let response = self.client.post(self.endpoint(segments)?).json(&body).send().await?;
		unwrap_value(response).await
	}

	async fn delete(&self, segments: &[&str]) -> Result<Value> {
		let response = self.client.delete(self.endpoint(segments)?).send().await?;
		unwrap_value(response).await
	}
}

/// Extracts the `value` field of a wire response, surfacing non-2xx
/// statuses with a body snippet.
async fn unwrap_value(response: reqwest::Response) -> Result<Value> {
	let status = response.status();
	let body = response.text().await?;
	if !status.is_success() {
		let detail: String = body.trim().chars().take(160).collect();
		return Err(DroverError::Protocol(format!("status {status}: {detail}")));
	}
	let document: Value = serde_json::from_str(&body).map_err(|e| DroverError::Protocol(format!("malformed response body: {e}")))?;
	Ok(document.get("value").cloned().unwrap_or(Value::Null))
}

#[async_trait]
impl AutomationDriver for HttpDriver {
	async fn create_session(&self, capabilities: &Value) -> Result<String> {
		debug!(target = "drover.driver", %capabilities, "creating session");
		let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
		let value = self.post(&["session"], body).await?;
		value
			.get("sessionId")
			.and_then(Value::as_str)
			.map(str::to_string)
			.ok_or_else(|| DroverError::Protocol("session response carries no sessionId".to_string()))
	}

	async fn execute(&self, session_id: &str, command: WireCommand) -> Result<Value> {
		debug!(target = "drover.driver", session = session_id, ?command, "executing command");
		match command {
			WireCommand::Navigate(url) => self.post(&["session", session_id, "url"], json!({ "url": url })).await,
			WireCommand::GetTitle => self.get(&["session", session_id, "title"]).await,
			WireCommand::GetPageSource => self.get(&["session", session_id, "source"]).await,
			WireCommand::TakeScreenshot => self.get(&["session", session_id, "screenshot"]).await,
			WireCommand::DeleteAllCookies => self.delete(&["session", session_id, "cookie"]).await,
			WireCommand::SetWindowRect { width, height } => {
				self.post(&["session", session_id, "window", "rect"], json!({ "width": width, "height": height }))
					.await
			}
			WireCommand::CloseWindow => self.delete(&["session", session_id, "window"]).await,
		}
	}

	async fn delete_session(&self, session_id: &str) -> Result<()> {
		debug!(target = "drover.driver", session = session_id, "deleting session");
		self.delete(&["session", session_id]).await.map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn driver(base: &str) -> HttpDriver {
		HttpDriver::new(&Url::parse(base).unwrap()).unwrap()
	}

	#[test]
	fn endpoint_joins_segments_under_base_path() {
		let driver = driver("http://localhost:4444/wd/hub");
		let url = driver.endpoint(&["session", "abc", "url"]).unwrap();
		assert_eq!(url.as_str(), "http://localhost:4444/wd/hub/session/abc/url");
	}

	#[test]
	fn endpoint_handles_trailing_slash() {
		let driver = driver("http://localhost:4444/");
		let url = driver.endpoint(&["session"]).unwrap();
		assert_eq!(url.as_str(), "http://localhost:4444/session");
	}
}
