//! Lifecycle event dispatch with ordered, synchronous subscribers.
//!
//! The dispatcher is an explicit per-instance registry owned by the
//! orchestrator. There is no global registration: collaborators subscribe
//! against the instance they are handed. Dispatch runs every handler for
//! the event to completion, in subscription order, before returning; the
//! first handler error aborts the remainder and propagates to the caller,
//! which treats it as a fatal startup condition.

use std::collections::HashMap;
use std::fmt;

use crate::config::RunConfiguration;
use crate::error::Result;
use crate::selector::TestCase;

/// Named points in the orchestration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
	/// Fired once, before validation and probing. Subscribers receive the
	/// mutable configuration and may adjust it.
	Configure,
	/// Fired once, after selection and before the first case. Subscribers
	/// receive the finalized configuration and the selected sequence.
	RunInit,
}

impl fmt::Display for LifecycleEventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LifecycleEventKind::Configure => write!(f, "CONFIGURE"),
			LifecycleEventKind::RunInit => write!(f, "RUN_INIT"),
		}
	}
}

/// Event payload handed to subscribers.
pub enum LifecycleEvent<'a> {
	Configure { config: &'a mut RunConfiguration },
	RunInit {
		config: &'a RunConfiguration,
		cases: &'a [TestCase],
	},
}

impl LifecycleEvent<'_> {
	pub fn kind(&self) -> LifecycleEventKind {
		match self {
			LifecycleEvent::Configure { .. } => LifecycleEventKind::Configure,
			LifecycleEvent::RunInit { .. } => LifecycleEventKind::RunInit,
		}
	}
}

type Handler = Box<dyn FnMut(&mut LifecycleEvent<'_>) -> Result<()> + Send>;

/// Ordered list of handlers per named event.
#[derive(Default)]
pub struct EventDispatcher {
	handlers: HashMap<LifecycleEventKind, Vec<Handler>>,
}

impl EventDispatcher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for `kind`. Handlers run in subscription order.
	pub fn subscribe<F>(&mut self, kind: LifecycleEventKind, handler: F)
	where
		F: FnMut(&mut LifecycleEvent<'_>) -> Result<()> + Send + 'static,
	{
		self.handlers.entry(kind).or_default().push(Box::new(handler));
	}

	/// Runs every handler subscribed to the event's kind. Returns the
	/// first handler error, leaving later handlers unexecuted.
	pub fn dispatch(&mut self, event: &mut LifecycleEvent<'_>) -> Result<()> {
		let kind = event.kind();
		let Some(handlers) = self.handlers.get_mut(&kind) else {
			return Ok(());
		};
		for handler in handlers {
			handler(event)?;
		}
		Ok(())
	}

	/// Number of handlers registered for `kind`.
	pub fn subscriber_count(&self, kind: LifecycleEventKind) -> usize {
		self.handlers.get(&kind).map_or(0, Vec::len)
	}
}
