use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Poll the WebDriver server's /status endpoint until it answers, so a
/// scheduler-launched run fails fast with a clear message when the driver
/// is absent instead of timing out inside session negotiation.
pub async fn wait_for_webdriver(url: &str, attempts: u32) -> Result<(), String> {
    let status_url = format!("{}/status", url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    for attempt in 1..=attempts {
        match client.get(&status_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("WebDriver ready after {} attempt(s)", attempt);
                return Ok(());
            }
            Ok(resp) => {
                warn!(
                    "WebDriver responded with {} (attempt {})",
                    resp.status(),
                    attempt
                );
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    info!("Waiting for WebDriver at {}... (attempt {})", url, attempt);
                }
            }
        }
        if attempt < attempts {
            sleep(Duration::from_millis(300)).await;
        }
    }

    Err(format!("WebDriver at {} did not become ready", url))
}

/// Connect to the WebDriver server, merging any extra capabilities on top
/// of the W3C defaults.
pub async fn connect(
    url: &str,
    capabilities: Option<serde_json::Map<String, serde_json::Value>>,
) -> Result<Client, String> {
    let mut caps = serde_json::Map::new();
    if let Some(user_caps) = capabilities {
        for (k, v) in user_caps {
            caps.insert(k, v);
        }
    }

    ClientBuilder::native()
        .capabilities(caps)
        .connect(url)
        .await
        .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", url, e))
}
