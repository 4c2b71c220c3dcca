use async_trait::async_trait;
use rouse_engine::config::WakeConfig;
use rouse_engine::controller::WakeUpController;
use rouse_engine::ladder::{APP_READY_SELECTORS, PRIMARY_SELECTOR};
use rouse_engine::session::{BrowserSession, Locator, SessionError};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What one document (root or frame) currently shows.
#[derive(Debug, Clone, Default)]
struct DocumentModel {
    primary: bool,
    secondary: bool,
    probe_clicks: bool,
    app_ready: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    calls: Vec<String>,
    root: DocumentModel,
    frames: Vec<DocumentModel>,
    /// None = root document.
    context: Option<usize>,
    /// Native clicks are rejected, forcing the script-click fallback.
    native_click_fails: bool,
    /// The probe script raises a driver error inside this frame.
    fail_probe_in_frame: Option<usize>,
    /// A successful click clears the prompt and brings the app surface up.
    wake_on_click: bool,
    /// Bounded waits time out even though instant checks see the prompt.
    prompt_hidden_from_waits: bool,
    closes: u32,
}

impl SessionState {
    fn context_label(&self) -> String {
        match self.context {
            None => "root".to_string(),
            Some(i) => format!("frame{}", i),
        }
    }

    fn current_doc(&self) -> DocumentModel {
        match self.context {
            None => self.root.clone(),
            Some(i) => self.frames[i].clone(),
        }
    }

    fn apply_wake(&mut self) {
        self.root.primary = false;
        self.root.secondary = false;
        self.root.app_ready = true;
        for frame in &mut self.frames {
            frame.primary = false;
            frame.secondary = false;
        }
    }
}

fn classify(locator: &Locator) -> &'static str {
    match locator {
        Locator::Css(s) if s == PRIMARY_SELECTOR => "primary",
        Locator::Css(s) if APP_READY_SELECTORS.contains(&s.as_str()) => "app",
        Locator::Css(_) => "other",
        Locator::XPath(_) => "secondary",
    }
}

#[derive(Clone)]
struct MockSession {
    state: Arc<Mutex<SessionState>>,
}

impl MockSession {
    fn new(state: SessionState) -> (Self, Arc<Mutex<SessionState>>) {
        let state = Arc::new(Mutex::new(state));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    type Element = String;
    type Frame = usize;

    async fn navigate(&mut self, _url: &str) -> Result<(), SessionError> {
        self.state.lock().unwrap().calls.push("navigate".into());
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.context = None;
        state.calls.push("refresh".into());
        Ok(())
    }

    async fn execute_script(&mut self, _script: &str) -> Result<Value, SessionError> {
        let mut state = self.state.lock().unwrap();
        let label = state.context_label();
        state.calls.push(format!("script:{}", label));

        if state.fail_probe_in_frame.is_some() && state.fail_probe_in_frame == state.context {
            return Err(SessionError::Script("execution context destroyed".into()));
        }

        if state.current_doc().probe_clicks {
            if state.wake_on_click {
                state.apply_wake();
            }
            Ok(json!(true))
        } else {
            Ok(json!(false))
        }
    }

    async fn find_element(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<String>, SessionError> {
        let mut state = self.state.lock().unwrap();
        let kind = classify(locator);
        let label = state.context_label();
        state
            .calls
            .push(format!("find:{}:{}:{}", kind, label, timeout.as_millis()));

        if state.prompt_hidden_from_waits && !timeout.is_zero() {
            return Ok(None);
        }

        let doc = state.current_doc();
        let present = match kind {
            "primary" => doc.primary,
            "secondary" => doc.secondary,
            "app" => doc.app_ready,
            _ => false,
        };
        Ok(present.then(|| kind.to_string()))
    }

    async fn click(&mut self, element: &String) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        let label = state.context_label();
        state.calls.push(format!("click:{}", label));

        if state.native_click_fails {
            return Err(SessionError::NotInteractable(format!(
                "{} is obscured",
                element
            )));
        }
        if state.wake_on_click {
            state.apply_wake();
        }
        Ok(())
    }

    async fn force_click(&mut self, _element: &String) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        let label = state.context_label();
        state.calls.push(format!("force_click:{}", label));
        if state.wake_on_click {
            state.apply_wake();
        }
        Ok(())
    }

    async fn list_frames(&mut self) -> Result<Vec<usize>, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list_frames".into());
        Ok((0..state.frames.len()).collect())
    }

    async fn enter_frame(&mut self, frame: &usize) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.context = Some(*frame);
        state.calls.push(format!("enter_frame:{}", frame));
        Ok(())
    }

    async fn enter_root(&mut self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.context = None;
        state.calls.push("enter_root".into());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.closes += 1;
        state.calls.push("close".into());
        Ok(())
    }
}

fn config() -> WakeConfig {
    WakeConfig::new("https://example.streamlit.app").unwrap()
}

fn count(calls: &[String], prefix: &str) -> usize {
    calls.iter().filter(|c| c.starts_with(prefix)).count()
}

#[tokio::test(start_paused = true)]
async fn primary_in_root_clicks_once_without_frame_enumeration() {
    let (session, state) = MockSession::new(SessionState {
        root: DocumentModel {
            primary: true,
            ..Default::default()
        },
        wake_on_click: true,
        ..Default::default()
    });

    let outcome = WakeUpController::new(session, config()).run().await;
    assert!(outcome.success, "unexpected failure: {}", outcome.message);
    assert!(outcome.message.contains("back up"));

    let state = state.lock().unwrap();
    assert_eq!(count(&state.calls, "click:"), 1);
    assert_eq!(count(&state.calls, "force_click:"), 0);
    assert_eq!(count(&state.calls, "list_frames"), 0);
    assert_eq!(count(&state.calls, "enter_frame:"), 0);
    assert_eq!(count(&state.calls, "script:"), 0);
    assert_eq!(state.closes, 1);
}

#[tokio::test(start_paused = true)]
async fn rungs_short_circuit_at_the_secondary_locator() {
    let (session, state) = MockSession::new(SessionState {
        root: DocumentModel {
            secondary: true,
            ..Default::default()
        },
        wake_on_click: true,
        ..Default::default()
    });

    let outcome = WakeUpController::new(session, config()).run().await;
    assert!(outcome.success, "unexpected failure: {}", outcome.message);

    let state = state.lock().unwrap();
    // Rung 1 missed, rung 2 hit, rung 3 never ran.
    assert_eq!(count(&state.calls, "find:primary:root:5000"), 1);
    assert_eq!(count(&state.calls, "find:secondary:root:3000"), 1);
    assert_eq!(count(&state.calls, "script:"), 0);
    assert_eq!(count(&state.calls, "click:"), 1);
}

#[tokio::test(start_paused = true)]
async fn native_click_failure_falls_back_to_the_script_click() {
    let (session, state) = MockSession::new(SessionState {
        root: DocumentModel {
            primary: true,
            ..Default::default()
        },
        native_click_fails: true,
        wake_on_click: true,
        ..Default::default()
    });

    let outcome = WakeUpController::new(session, config()).run().await;
    assert!(outcome.success, "unexpected failure: {}", outcome.message);
    assert!(outcome.message.contains("back up"));

    let state = state.lock().unwrap();
    assert_eq!(count(&state.calls, "click:root"), 1);
    assert_eq!(count(&state.calls, "force_click:root"), 1);
}

#[tokio::test(start_paused = true)]
async fn trigger_in_third_of_four_frames_stops_iteration_and_restores_root() {
    let mut frames = vec![DocumentModel::default(); 4];
    frames[2].primary = true;
    let (session, state) = MockSession::new(SessionState {
        frames,
        wake_on_click: true,
        ..Default::default()
    });

    let outcome = WakeUpController::new(session, config()).run().await;
    assert!(outcome.success, "unexpected failure: {}", outcome.message);

    let state = state.lock().unwrap();
    let entered: Vec<&String> = state
        .calls
        .iter()
        .filter(|c| c.starts_with("enter_frame:"))
        .collect();
    assert_eq!(entered, ["enter_frame:0", "enter_frame:1", "enter_frame:2"]);

    // Root context is restored after every frame attempt, before anything
    // else happens in the next one.
    let mut depth_ok = true;
    let mut inside_frame = false;
    for call in &state.calls {
        if call.starts_with("enter_frame:") {
            if inside_frame {
                depth_ok = false;
            }
            inside_frame = true;
        } else if call == "enter_root" {
            inside_frame = false;
        }
    }
    assert!(depth_ok, "entered a frame without restoring root first");
    assert!(!inside_frame, "run ended inside a frame context");

    assert_eq!(count(&state.calls, "click:frame2"), 1);
    assert!(state.context.is_none());
}

#[tokio::test(start_paused = true)]
async fn already_awake_target_succeeds_without_any_trigger() {
    let (session, state) = MockSession::new(SessionState {
        root: DocumentModel::default(),
        frames: vec![DocumentModel::default()],
        ..Default::default()
    });

    let outcome = WakeUpController::new(session.clone(), config()).run().await;
    assert!(outcome.success, "unexpected failure: {}", outcome.message);
    assert!(outcome.message.contains("already awake"));

    {
        let state = state.lock().unwrap();
        assert_eq!(count(&state.calls, "click:"), 0);
        assert_eq!(count(&state.calls, "force_click:"), 0);
        assert_eq!(state.closes, 1);
    }

    // Re-running the full protocol against the unchanged target is
    // idempotent: same verdict, still no trigger reported.
    let outcome = WakeUpController::new(session, config()).run().await;
    assert!(outcome.success);
    assert!(outcome.message.contains("already awake"));

    let state = state.lock().unwrap();
    assert_eq!(count(&state.calls, "click:"), 0);
    assert_eq!(state.closes, 2);
}

#[tokio::test(start_paused = true)]
async fn verification_runs_exactly_the_configured_number_of_rounds() {
    let (session, state) = MockSession::new(SessionState {
        root: DocumentModel {
            primary: true,
            ..Default::default()
        },
        // The click lands but the page never changes.
        wake_on_click: false,
        ..Default::default()
    });

    let mut config = config();
    config.max_poll_rounds = 4;

    let outcome = WakeUpController::new(session, config).run().await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("could not be verified"));

    let state = state.lock().unwrap();
    // One instant primary check per verification round, no more, no fewer.
    assert_eq!(count(&state.calls, "find:primary:root:0"), 4);
}

#[tokio::test(start_paused = true)]
async fn unreachable_prompt_with_sleeping_app_is_locator_exhausted() {
    let (session, state) = MockSession::new(SessionState {
        root: DocumentModel {
            primary: true,
            ..Default::default()
        },
        // Bounded waits never resolve, so the whole ladder comes up empty,
        // but the instant verification checks still see the prompt.
        prompt_hidden_from_waits: true,
        ..Default::default()
    });

    let outcome = WakeUpController::new(session, config()).run().await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("Could not find the wake entry point"));

    let state = state.lock().unwrap();
    assert_eq!(count(&state.calls, "click:"), 0);
    assert_eq!(state.closes, 1);
}

#[tokio::test(start_paused = true)]
async fn root_context_is_restored_when_a_frame_attempt_errors() {
    let (session, state) = MockSession::new(SessionState {
        frames: vec![DocumentModel::default(), DocumentModel::default()],
        fail_probe_in_frame: Some(0),
        ..Default::default()
    });

    let outcome = WakeUpController::new(session, config()).run().await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("Driver error"));

    let state = state.lock().unwrap();
    assert!(state.context.is_none(), "context was left inside a frame");
    let enter_frame_0 = state
        .calls
        .iter()
        .position(|c| c == "enter_frame:0")
        .unwrap();
    assert!(
        state.calls[enter_frame_0..]
            .iter()
            .any(|c| c == "enter_root"),
        "root was not restored after the failing frame attempt"
    );
    // The error stopped the iteration; frame 1 was never entered.
    assert_eq!(count(&state.calls, "enter_frame:1"), 0);
    // The session is still released on the error path.
    assert_eq!(state.closes, 1);
}
