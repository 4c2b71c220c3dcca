use crate::session::Locator;
use std::time::Duration;

/// Stable identifying attribute of the wake button.
pub const PRIMARY_SELECTOR: &str = "button[data-testid='wakeup-button-owner']";

/// Structural text match, robust to attribute renames across releases.
pub const SECONDARY_XPATH: &str = "//button[contains(., 'Yes') and contains(., 'app back up')]";

/// Elements present only once the application's main surface has loaded.
pub const APP_READY_SELECTORS: &[&str] = &[
    "[data-testid='stAppViewContainer']",
    "[data-testid='stSidebar']",
];

/// Ordered fallback strategies for finding and triggering the wake button,
/// most specific first. Each rung uses a shorter bounded wait than the
/// previous one so the total latency of a miss stays bounded.
///
/// The probe script is the last resort: it scans and clicks entirely inside
/// the page. Only fixed, reviewed script bodies are accepted.
#[derive(Debug, Clone)]
pub struct LocatorLadder {
    pub primary: Locator,
    pub primary_wait: Duration,
    pub secondary: Locator,
    pub secondary_wait: Duration,
    pub probe_script: &'static str,
    pub app_ready: Vec<Locator>,
}

impl Default for LocatorLadder {
    fn default() -> Self {
        Self {
            primary: Locator::css(PRIMARY_SELECTOR),
            primary_wait: Duration::from_secs(5),
            secondary: Locator::xpath(SECONDARY_XPATH),
            secondary_wait: Duration::from_secs(3),
            probe_script: rouse_probe::PROBE_JS,
            app_ready: APP_READY_SELECTORS
                .iter()
                .map(|s| Locator::css(*s))
                .collect(),
        }
    }
}
