use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    #[error("Frame switch failed: {0}")]
    Frame(String),

    #[error("Session is not ready")]
    NotReady,

    #[error("{0}")]
    Other(String),
}

/// How to locate the wake button inside the current document context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }
}

/// The BrowserSession trait is the capability contract the controller drives.
/// A driver crate supplies the implementation; the engine never talks to a
/// browser directly.
///
/// Element and frame handles are associated types so the protocol stays
/// driver-agnostic. Handles are only valid inside the document context they
/// were found in.
#[async_trait]
pub trait BrowserSession: Send {
    type Element: Send + Sync;
    type Frame: Send + Sync;

    /// Load a page in the current window.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Reload the current page. Resets the context to the root document.
    async fn refresh(&mut self) -> Result<(), SessionError>;

    /// Run a script in the current document context and return its
    /// JSON-serializable result.
    async fn execute_script(&mut self, script: &str) -> Result<Value, SessionError>;

    /// Bounded wait for element presence. A zero timeout is a single
    /// immediate check. Absence is `Ok(None)`, never an error.
    async fn find_element(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<Self::Element>, SessionError>;

    /// Native click on a previously found element.
    async fn click(&mut self, element: &Self::Element) -> Result<(), SessionError>;

    /// Script-forced click on the same element reference, for elements the
    /// native click rejects.
    async fn force_click(&mut self, element: &Self::Element) -> Result<(), SessionError>;

    /// Enumerate the embedded frames of the current document, in document
    /// order. The root document itself is not listed.
    async fn list_frames(&mut self) -> Result<Vec<Self::Frame>, SessionError>;

    /// Switch the automation context into a frame.
    async fn enter_frame(&mut self, frame: &Self::Frame) -> Result<(), SessionError>;

    /// Return the automation context to the root document.
    async fn enter_root(&mut self) -> Result<(), SessionError>;

    /// Release the session. Must be safe to call exactly once per run.
    async fn close(&mut self) -> Result<(), SessionError>;
}
