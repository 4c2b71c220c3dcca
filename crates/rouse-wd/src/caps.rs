use serde_json::{Map, Value, json};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Detect a CI environment where no display server is available.
pub fn is_ci_environment() -> bool {
    std::env::var("CI").is_ok() || std::env::var("GITHUB_ACTIONS").is_ok()
}

/// Chrome capabilities for the wake-up session. Headless mode adds the
/// sandbox and shared-memory flags CI runners need, plus a fixed window
/// size and a conventional user agent so the hosting provider serves the
/// same markup it serves a desktop browser.
pub fn chrome_capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec!["--disable-blink-features=AutomationControlled".to_string()];
    if headless {
        args.push("--headless=new".to_string());
        args.push("--no-sandbox".to_string());
        args.push("--disable-dev-shm-usage".to_string());
        args.push("--window-size=1920,1080".to_string());
        args.push(format!("--user-agent={}", USER_AGENT));
    }

    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
        }),
    );
    caps
}
