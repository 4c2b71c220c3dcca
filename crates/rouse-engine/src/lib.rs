pub mod config;
pub mod controller;
pub mod error;
pub mod ladder;
pub mod session;

pub use config::{ConfigError, WakeConfig};
pub use controller::{AttemptResult, Outcome, VerificationState, WakeUpController};
pub use error::WakeError;
pub use ladder::LocatorLadder;
pub use session::{BrowserSession, Locator, SessionError};
