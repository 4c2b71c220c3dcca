use crate::config::WakeConfig;
use crate::error::WakeError;
use crate::ladder::LocatorLadder;
use crate::session::BrowserSession;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Outcome of one trigger attempt in a single document context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    Triggered,
    NotFound,
}

/// Outcome of the post-action check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Confirmed,
    Unconfirmed,
}

/// Final protocol result, the only externally observable artifact of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

/// Owns the end-to-end wake-up protocol: open the target page, attempt to
/// trigger the wake action (root document first, then each embedded frame),
/// then verify the action succeeded with bounded polling.
///
/// Each run is independent and repeats the full protocol; no state survives
/// between runs. Re-running against an already-awake target reports success
/// without side effects beyond the detection checks.
pub struct WakeUpController<S: BrowserSession> {
    session: S,
    config: WakeConfig,
    ladder: LocatorLadder,
}

impl<S: BrowserSession> WakeUpController<S> {
    pub fn new(session: S, config: WakeConfig) -> Self {
        Self::with_ladder(session, config, LocatorLadder::default())
    }

    pub fn with_ladder(session: S, config: WakeConfig, ladder: LocatorLadder) -> Self {
        Self {
            session,
            config,
            ladder,
        }
    }

    /// Run the protocol to completion. The session is released on every exit
    /// path, including driver errors raised mid-protocol.
    pub async fn run(mut self) -> Outcome {
        let result = self.wake().await;

        if let Err(e) = self.session.close().await {
            warn!("Failed to close the browser session: {}", e);
        }

        match result {
            Ok(message) => {
                info!("Run finished: {}", message);
                Outcome {
                    success: true,
                    message,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Run failed: {}", message);
                Outcome {
                    success: false,
                    message,
                }
            }
        }
    }

    async fn wake(&mut self) -> Result<String, WakeError> {
        info!("Navigating to: {}", self.config.target_url);
        let url = self.config.target_url.clone();
        self.session.navigate(&url).await?;

        debug!(
            "Waiting {:?} for the page to settle",
            self.config.settle_delay
        );
        sleep(self.config.settle_delay).await;

        let mut attempt = self.try_trigger("root document").await?;
        if attempt == AttemptResult::NotFound {
            attempt = self.trigger_in_frames().await?;
        }

        match attempt {
            AttemptResult::Triggered => {
                debug!(
                    "Trigger fired, waiting {:?} for the wake request",
                    self.config.post_action_delay
                );
                sleep(self.config.post_action_delay).await;

                info!("Refreshing the page for final verification");
                self.session.refresh().await?;
                sleep(self.config.post_action_delay).await;

                match self.verify().await? {
                    VerificationState::Confirmed => {
                        Ok("Wake-up completed, the application is back up".to_string())
                    }
                    VerificationState::Unconfirmed => Err(WakeError::Verification),
                }
            }
            AttemptResult::NotFound => {
                info!("No wake button found, checking whether the application is already up");
                match self.verify().await? {
                    VerificationState::Confirmed => {
                        Ok("Application is already awake, no action needed".to_string())
                    }
                    VerificationState::Unconfirmed => Err(WakeError::LocatorExhausted),
                }
            }
        }
    }

    /// The locator/trigger ladder, tried in order; the first rung that finds
    /// the button short-circuits the rest.
    async fn try_trigger(&mut self, context: &str) -> Result<AttemptResult, WakeError> {
        info!("Searching for the wake button in {}", context);

        if let Some(element) = self
            .session
            .find_element(&self.ladder.primary, self.ladder.primary_wait)
            .await?
        {
            debug!("Primary locator matched in {}", context);
            self.click_with_fallback(&element, context).await?;
            return Ok(AttemptResult::Triggered);
        }

        if let Some(element) = self
            .session
            .find_element(&self.ladder.secondary, self.ladder.secondary_wait)
            .await?
        {
            debug!("Secondary locator matched in {}", context);
            self.click_with_fallback(&element, context).await?;
            return Ok(AttemptResult::Triggered);
        }

        // Last resort: scan and click entirely inside the page. Reports
        // absence instead of throwing.
        let clicked = self
            .session
            .execute_script(self.ladder.probe_script)
            .await?;
        if clicked.as_bool().unwrap_or(false) {
            info!("Script probe clicked the wake button in {}", context);
            return Ok(AttemptResult::Triggered);
        }

        Ok(AttemptResult::NotFound)
    }

    async fn click_with_fallback(
        &mut self,
        element: &S::Element,
        context: &str,
    ) -> Result<(), WakeError> {
        match self.session.click(element).await {
            Ok(()) => {
                info!("Clicked the wake button in {}", context);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Native click failed in {} ({}), falling back to a script click",
                    context, e
                );
                self.session.force_click(element).await?;
                info!("Script-forced click executed in {}", context);
                Ok(())
            }
        }
    }

    /// Frames are discovered only after the root attempt came up empty; the
    /// common case never pays for the enumeration. Iteration stops at the
    /// first trigger, and the context is returned to the root document after
    /// every frame attempt, success or failure.
    async fn trigger_in_frames(&mut self) -> Result<AttemptResult, WakeError> {
        let frames = self.session.list_frames().await?;
        info!(
            "Wake button not in the root document, probing {} embedded frame(s)",
            frames.len()
        );

        for (index, frame) in frames.iter().enumerate() {
            self.session.enter_frame(frame).await?;
            let attempt = self.try_trigger(&format!("frame #{}", index)).await;
            let restored = self.session.enter_root().await;

            let attempt = attempt?;
            restored?;

            if attempt == AttemptResult::Triggered {
                return Ok(AttemptResult::Triggered);
            }
        }

        Ok(AttemptResult::NotFound)
    }

    /// Bounded verification polling against the root document. Runs exactly
    /// the configured number of rounds before declaring the outcome
    /// unconfirmed.
    async fn verify(&mut self) -> Result<VerificationState, WakeError> {
        info!(
            "Verifying the wake outcome ({} round(s))",
            self.config.max_poll_rounds
        );
        self.session.enter_root().await?;

        for round in 1..=self.config.max_poll_rounds {
            if self.verify_round().await? == VerificationState::Confirmed {
                info!("Verification confirmed on round {}", round);
                return Ok(VerificationState::Confirmed);
            }
            debug!(
                "Round {}/{} unconfirmed",
                round, self.config.max_poll_rounds
            );
            if round < self.config.max_poll_rounds {
                sleep(self.config.poll_interval).await;
            }
        }

        Ok(VerificationState::Unconfirmed)
    }

    /// One verification round: confirmed when the wake prompt is gone from
    /// the root document, or when the application surface is present. The
    /// latter covers prompts that are replaced rather than removed.
    async fn verify_round(&mut self) -> Result<VerificationState, WakeError> {
        let mut prompt_present = self
            .session
            .find_element(&self.ladder.primary, Duration::ZERO)
            .await?
            .is_some();
        if !prompt_present {
            prompt_present = self
                .session
                .find_element(&self.ladder.secondary, Duration::ZERO)
                .await?
                .is_some();
        }
        if !prompt_present {
            return Ok(VerificationState::Confirmed);
        }

        for locator in &self.ladder.app_ready {
            if self
                .session
                .find_element(locator, Duration::ZERO)
                .await?
                .is_some()
            {
                return Ok(VerificationState::Confirmed);
            }
        }

        Ok(VerificationState::Unconfirmed)
    }
}
