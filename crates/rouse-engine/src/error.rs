use crate::session::SessionError;
use thiserror::Error;

/// Terminal failures of one protocol run. None of these are retried beyond
/// the bounded retry points inside the protocol (locator rungs, frame
/// iteration, verification polling); the controller converts each into a
/// `(false, message)` outcome.
#[derive(Debug, Error)]
pub enum WakeError {
    #[error("Could not find the wake entry point and the application is not already running")]
    LocatorExhausted,

    #[error("Wake action executed but the outcome could not be verified")]
    Verification,

    #[error("Driver error: {0}")]
    Driver(#[from] SessionError),
}
