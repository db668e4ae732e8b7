//! WebDriver session setup and teardown.

use std::process::Stdio;
use std::time::Duration;

use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::error::{Error, Result};

const DRIVER_READY_ATTEMPTS: u32 = 20;
const DRIVER_READY_INTERVAL: Duration = Duration::from_millis(250);

/// Ways of getting a browser session, tried in [`SETUP_CASCADE`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStrategy {
    /// A WebDriver server that is already running.
    Direct,
    /// Spawn the configured chromedriver binary and talk to it.
    DriverService,
    /// Plain `browserName` capabilities, without Chrome specific options.
    LegacyCapabilities,
}

pub const SETUP_CASCADE: [SetupStrategy; 3] = [
    SetupStrategy::Direct,
    SetupStrategy::DriverService,
    SetupStrategy::LegacyCapabilities,
];

/// A live browser plus the driver process we started for it, if any.
pub struct BrowserSession {
    pub client: Client,
    driver: Option<Child>,
}

impl BrowserSession {
    /// Try every strategy in turn. Fails only when none of them works.
    pub async fn start(config: &ScrapeConfig) -> Result<Self> {
        let mut failures = Vec::new();
        for strategy in SETUP_CASCADE {
            match strategy.connect(config).await {
                Ok(session) => {
                    debug!("Browser session started via {:?}", strategy);
                    return Ok(session);
                }
                Err(e) => {
                    warn!("{:?} driver attempt failed: {}", strategy, e);
                    failures.push(format!("{:?}: {}", strategy, e));
                }
            }
        }
        Err(Error::BrowserSetup(format!(
            "all attempts failed ({}). Make sure Chrome and chromedriver are installed",
            failures.join("; ")
        )))
    }

    /// Close the WebDriver session and stop our driver process.
    pub async fn quit(self) {
        if let Err(e) = self.client.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        if let Some(mut driver) = self.driver {
            if let Err(e) = driver.kill().await {
                debug!("chromedriver already gone: {}", e);
            }
        }
    }
}

impl SetupStrategy {
    async fn connect(&self, config: &ScrapeConfig) -> Result<BrowserSession> {
        match self {
            SetupStrategy::Direct => {
                let client = new_client(&config.webdriver_url, chrome_capabilities(config.headless)).await?;
                Ok(BrowserSession { client, driver: None })
            }
            SetupStrategy::DriverService => spawn_and_connect(config, chrome_capabilities(config.headless)).await,
            SetupStrategy::LegacyCapabilities => {
                match new_client(&config.webdriver_url, legacy_capabilities()).await {
                    Ok(client) => Ok(BrowserSession { client, driver: None }),
                    Err(e) => {
                        debug!("Legacy capabilities rejected at {}: {}", config.webdriver_url, e);
                        spawn_and_connect(config, legacy_capabilities()).await
                    }
                }
            }
        }
    }
}

async fn spawn_and_connect(config: &ScrapeConfig, capabilities: Map<String, Value>) -> Result<BrowserSession> {
    let url = format!("http://localhost:{}", config.driver_port);
    info!("Starting {} on port {}", config.chromedriver.display(), config.driver_port);
    let driver = Command::new(&config.chromedriver)
        .arg(format!("--port={}", config.driver_port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    // The driver needs a moment before it accepts sessions.
    let mut last_error = None;
    for _ in 0..DRIVER_READY_ATTEMPTS {
        tokio::time::sleep(DRIVER_READY_INTERVAL).await;
        match new_client(&url, capabilities.clone()).await {
            Ok(client) => {
                return Ok(BrowserSession {
                    client,
                    driver: Some(driver),
                })
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| Error::BrowserSetup("chromedriver did not start".to_string())))
}

async fn new_client(url: &str, capabilities: Map<String, Value>) -> Result<Client> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities);
    builder
        .connect(url)
        .await
        .map_err(|e| Error::BrowserSetup(e.to_string()))
}

pub fn chrome_capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage", "--disable-gpu"];
    if headless {
        args.push("--headless=new");
    }
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

pub fn legacy_capabilities() -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_options_include_sandbox_flags() {
        let caps = chrome_capabilities(false);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--no-sandbox")));
        assert!(args.contains(&json!("--disable-dev-shm-usage")));
        assert!(!args.contains(&json!("--headless=new")));
    }

    #[test]
    fn headless_adds_flag() {
        let caps = chrome_capabilities(true);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless=new")));
    }

    #[test]
    fn legacy_capabilities_carry_no_chrome_options() {
        let caps = legacy_capabilities();
        assert_eq!(caps["browserName"], json!("chrome"));
        assert!(!caps.contains_key("goog:chromeOptions"));
    }

    #[test]
    fn cascade_order() {
        assert_eq!(
            SETUP_CASCADE,
            [
                SetupStrategy::Direct,
                SetupStrategy::DriverService,
                SetupStrategy::LegacyCapabilities
            ]
        );
    }
}
