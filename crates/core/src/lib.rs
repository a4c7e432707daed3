//! drover — launches and supervises browser test suites against a remote
//! automation server.
//!
//! The crate validates the execution environment, confirms the configured
//! endpoint is genuinely a compatible automation server, selects the cases
//! to run, notifies subscribers at fixed lifecycle points, and guarantees
//! each case an isolated, cleanly torn-down session whatever the case
//! body does.

pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod preflight;
pub mod probe;
pub mod quirks;
pub mod runner;
pub mod scenario;
pub mod selector;
pub mod session;

pub use config::{DEFAULT_SERVER_URL, RunConfiguration};
pub use driver::{AutomationDriver, HttpDriver, WireCommand};
pub use error::{DroverError, Result};
pub use events::{EventDispatcher, LifecycleEvent, LifecycleEventKind};
pub use orchestrator::{EXIT_FAILURE, EXIT_SUCCESS, RunLauncher};
pub use probe::{HttpProber, ServerHealth, ServerProbe};
pub use quirks::{QuirkEntry, QuirkTable};
pub use runner::{CaseOutcome, CaseRunner, ScenarioRunner};
pub use scenario::{Scenario, ScenarioStep};
pub use selector::{CASE_FILE_SUFFIX, TestCase};
pub use session::{SessionHandle, SessionLifecycleManager};
