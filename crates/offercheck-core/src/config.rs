use crate::poll::PollConfig;
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.tui.pl/";
pub const DEFAULT_DEBUGGING_PORT: u16 = 9222;

/// Pause before reading the birth-year tiles; the calendar slides in
pub const DEFAULT_CALENDAR_SETTLE: Duration = Duration::from_millis(3000);

pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a flow run needs, passed explicitly to the entry point
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_url: Url,
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub debugging_port: u16,
    /// Budget for the flaky calendar tiles
    pub poll: PollConfig,
    pub calendar_settle: Duration,
    /// Budget for page loads, visible-element waits and new tabs
    pub navigation_timeout: Duration,
}

impl RunConfig {
    /// Config with defaults for everything but the site under test
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            chrome_path: None,
            headless: false,
            debugging_port: DEFAULT_DEBUGGING_PORT,
            poll: PollConfig::default(),
            calendar_settle: DEFAULT_CALENDAR_SETTLE,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        })
    }

    /// Poll settings for the longer waits, sharing the calendar interval
    pub fn navigation_poll(&self) -> Result<PollConfig> {
        PollConfig::new(self.navigation_timeout, self.poll.interval())
    }

    pub fn validate(&self) -> Result<()> {
        if self.debugging_port == 0 {
            return Err(Error::InvalidConfig(
                "debugging port must be non-zero".to_string(),
            ));
        }
        self.navigation_poll()
            .map_err(|e| Error::InvalidConfig(format!("navigation timeout: {}", e)))?;
        Ok(())
    }
}

/// Parse a base URL, adding `https://` when no scheme is given
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::InvalidConfig("base URL is empty".to_string()));
    }

    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    Url::parse(&with_scheme)
        .map_err(|e| Error::InvalidConfig(format!("invalid base URL '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_production_site() {
        let config = RunConfig::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(config.base_url.as_str(), "https://www.tui.pl/");
        assert_eq!(config.debugging_port, 9222);
        assert_eq!(config.poll, PollConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_base_url_adds_scheme() {
        let url = parse_base_url("staging.example.com").unwrap();
        assert_eq!(url.as_str(), "https://staging.example.com/");

        let url = parse_base_url("http://localhost:8080").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_parse_base_url_rejects_empty() {
        assert!(matches!(parse_base_url("  "), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_navigation_timeout_shorter_than_interval_is_invalid() {
        let mut config = RunConfig::new("https://example.com").unwrap();
        config.navigation_timeout = Duration::from_millis(10);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
