use clap::Parser;
use rouse_engine::{WakeConfig, WakeUpController};
use rouse_wd::caps;
use rouse_wd::session::WebDriverSession;
use rouse_wd::webdriver;
use tracing::{error, info};

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const READINESS_ATTEMPTS: u32 = 10;

#[derive(Parser, Debug)]
#[command(
    name = "rouse",
    version,
    about = "Wake a suspended hosted app by clicking its resume prompt"
)]
struct Args {
    /// Target page URL. Falls back to ROUSE_TARGET_URL.
    #[arg(short, long)]
    url: Option<String>,

    /// WebDriver server URL. Falls back to WEBDRIVER_URL, then localhost:9515.
    #[arg(short, long)]
    webdriver_url: Option<String>,

    /// Run the browser headless (implied in CI environments)
    #[arg(long)]
    headless: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the final outcome line.
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match WakeConfig::resolve(args.url) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let webdriver_url = args
        .webdriver_url
        .or_else(|| {
            std::env::var("WEBDRIVER_URL")
                .ok()
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string());

    if let Err(e) = webdriver::wait_for_webdriver(&webdriver_url, READINESS_ATTEMPTS).await {
        error!("{}", e);
        std::process::exit(1);
    }

    let headless = args.headless || caps::is_ci_environment();
    let capabilities = caps::chrome_capabilities(headless);

    info!("Connecting to WebDriver at {}", webdriver_url);
    let client = match webdriver::connect(&webdriver_url, Some(capabilities)).await {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let session = WebDriverSession::new(client);
    let outcome = WakeUpController::new(session, config).run().await;

    println!("{}", outcome.message);
    std::process::exit(if outcome.success { 0 } else { 1 });
}
