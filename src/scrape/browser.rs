//! Chrome-backed page source over the DevTools protocol.
//!
//! The portal refuses plain HTTP clients and renders everything client
//! side, so the only reliable way in is a real browser. One page is kept
//! open for the whole run and navigated from record to record.

#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
#[cfg(feature = "browser")]
use anyhow::Context;
#[cfg(feature = "browser")]
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "browser")]
use tracing::info;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::{NavigateParams, ReloadParams};
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;

#[cfg(feature = "browser")]
use super::{DetailPageSource, SourceError};

/// Browser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Run without a visible window (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Chrome executable override. When unset, well-known install
    /// locations and PATH are searched.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// DevTools URL of an already-running Chrome (e.g. "http://localhost:9222").
    /// If set, connects to it instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// User agent presented to the portal.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string()
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            remote_url: None,
            user_agent: default_user_agent(),
            chrome_args: Vec::new(),
        }
    }
}

/// A running Chrome with one page open.
#[cfg(feature = "browser")]
pub struct BrowserSession {
    /// Keeps the process alive; dropping it ends a launched Chrome.
    browser: Browser,
    page: Page,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Launch Chrome, or connect to a remote one when configured.
    pub async fn start(options: &BrowserOptions) -> Result<Self> {
        match &options.remote_url {
            Some(url) => Self::connect(url, options).await,
            None => Self::launch(options).await,
        }
    }

    async fn launch(options: &BrowserOptions) -> Result<Self> {
        info!("Launching browser (headless={})", options.headless);

        let chrome_path = Self::find_chrome(options)?;

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !options.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--window-size=1920,1080")
            .arg("--ignore-certificate-errors")
            .arg("--disable-blink-features=AutomationControlled");

        for arg in &options.chrome_args {
            builder = builder.arg(arg.as_str());
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = Self::open_page(&browser, options).await?;

        Ok(Self { browser, page })
    }

    /// Connect to a remote Chrome instance via its DevTools endpoint.
    async fn connect(url: &str, options: &BrowserOptions) -> Result<Self> {
        info!("Connecting to remote browser at {}", url);

        // Resolve the WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let client = reqwest::Client::new();
        let resp: serde_json::Value = client
            .get(&version_url)
            .send()
            .await
            .context("Failed to reach remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .context("Failed to connect to remote browser")?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = Self::open_page(&browser, options).await?;

        Ok(Self { browser, page })
    }

    /// Find the Chrome executable.
    fn find_chrome(options: &BrowserOptions) -> Result<PathBuf> {
        // Check explicit path first
        if let Some(ref path) = options.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            anyhow::bail!("Configured Chrome executable not found: {}", path.display());
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Install it, set [browser].executable, \
             or point [browser].remote_url at a running instance"
        ))
    }

    async fn open_page(browser: &Browser, options: &BrowserOptions) -> Result<Page> {
        let page = browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(options.user_agent.clone()))
            .await?;
        Ok(page)
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl DetailPageSource for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| SourceError::Navigation(format!("invalid URL: {}", e)))?;
        self.page
            .execute(params)
            .await
            .map_err(|e| SourceError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), SourceError> {
        self.page
            .execute(ReloadParams::default())
            .await
            .map_err(|e| SourceError::Reload(e.to_string()))?;
        Ok(())
    }

    async fn visible_text(&mut self) -> Result<String, SourceError> {
        let result = self
            .page
            .evaluate("document.body.innerText".to_string())
            .await
            .map_err(|e| SourceError::PageText(e.to_string()))?;
        result
            .into_value::<String>()
            .map_err(|e| SourceError::PageText(e.to_string()))
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserSession;

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn start(_options: &BrowserOptions) -> Result<Self> {
        Err(anyhow::anyhow!(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
        ))
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait::async_trait]
impl super::DetailPageSource for BrowserSession {
    async fn navigate(&mut self, _url: &str) -> Result<(), super::SourceError> {
        Err(super::SourceError::Navigation(
            "browser support not compiled".to_string(),
        ))
    }

    async fn refresh(&mut self) -> Result<(), super::SourceError> {
        Err(super::SourceError::Reload(
            "browser support not compiled".to_string(),
        ))
    }

    async fn visible_text(&mut self) -> Result<String, super::SourceError> {
        Err(super::SourceError::PageText(
            "browser support not compiled".to_string(),
        ))
    }
}
