use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator as WdLocator};
use rouse_engine::session::{BrowserSession, Locator, SessionError};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// How often the bounded wait re-checks for element presence.
const WAIT_PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// BrowserSession implementation over a WebDriver session.
///
/// Frames are addressed by their index in document order, which is how the
/// WebDriver switch-to-frame command identifies them.
pub struct WebDriverSession {
    client: Option<Client>,
}

impl WebDriverSession {
    pub fn new(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&mut self) -> Result<&mut Client, SessionError> {
        self.client.as_mut().ok_or(SessionError::NotReady)
    }
}

fn wd_locator(locator: &Locator) -> WdLocator<'_> {
    match locator {
        Locator::Css(selector) => WdLocator::Css(selector),
        Locator::XPath(expression) => WdLocator::XPath(expression),
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = Element;
    type Frame = u16;

    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let client = self.client()?;
        client
            .goto(url)
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        let client = self.client()?;
        client
            .refresh()
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))
    }

    async fn execute_script(&mut self, script: &str) -> Result<Value, SessionError> {
        let client = self.client()?;
        client
            .execute(script, vec![])
            .await
            .map_err(|e| SessionError::Script(e.to_string()))
    }

    async fn find_element(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<Element>, SessionError> {
        let client = self.client()?;
        let target = wd_locator(locator);

        if timeout.is_zero() {
            // Single immediate check, used by the verification polling.
            let mut found = client
                .find_all(target)
                .await
                .map_err(|e| SessionError::Other(e.to_string()))?;
            if found.is_empty() {
                return Ok(None);
            }
            return Ok(Some(found.remove(0)));
        }

        match client
            .wait()
            .at_most(timeout)
            .every(WAIT_PROBE_INTERVAL)
            .for_element(target)
            .await
        {
            Ok(element) => Ok(Some(element)),
            Err(CmdError::WaitTimeout) => {
                debug!("No match for {:?} within {:?}", locator, timeout);
                Ok(None)
            }
            Err(e) => Err(SessionError::Other(e.to_string())),
        }
    }

    async fn click(&mut self, element: &Element) -> Result<(), SessionError> {
        element
            .click()
            .await
            .map_err(|e| SessionError::NotInteractable(e.to_string()))
    }

    async fn force_click(&mut self, element: &Element) -> Result<(), SessionError> {
        // The element reference is passed as a script argument; the script
        // body itself is fixed.
        let argument =
            serde_json::to_value(element).map_err(|e| SessionError::Script(e.to_string()))?;
        let client = self.client()?;
        client
            .execute(rouse_probe::FORCE_CLICK_JS, vec![argument])
            .await
            .map_err(|e| SessionError::Script(e.to_string()))?;
        Ok(())
    }

    async fn list_frames(&mut self) -> Result<Vec<u16>, SessionError> {
        let client = self.client()?;
        let frames = client
            .find_all(WdLocator::Css("iframe"))
            .await
            .map_err(|e| SessionError::Other(e.to_string()))?;
        Ok((0..frames.len() as u16).collect())
    }

    async fn enter_frame(&mut self, frame: &u16) -> Result<(), SessionError> {
        let client = self.client()?;
        client
            .enter_frame(Some(*frame))
            .await
            .map_err(|e| SessionError::Frame(e.to_string()))
    }

    async fn enter_root(&mut self) -> Result<(), SessionError> {
        let client = self.client()?;
        client
            .enter_frame(None)
            .await
            .map_err(|e| SessionError::Frame(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| SessionError::Other(e.to_string()))?;
        }
        Ok(())
    }
}
