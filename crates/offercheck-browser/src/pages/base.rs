use crate::{Error, Locator, Result};
use chromiumoxide::Page;
use offercheck_core::{Clock, PollConfig, PollOutcome, PollTarget, Poller};
use std::time::Duration;

/// Consent banner button; the id changes between deployments but keeps this fragment
const COOKIE_ACCEPT: &str = "[id*=\"AllowAll\"]";

/// How long to look for the consent banner; a reused profile never shows it
const CONSENT_TIMEOUT: Duration = Duration::from_secs(5);
const CONSENT_INTERVAL: Duration = Duration::from_millis(250);

/// Shared behaviour of every page on the site
pub struct BasePage {
    page: Page,
    poller: Poller,
    wait: PollConfig,
    cookie_accept: Locator,
}

impl BasePage {
    /// `wait` bounds page loads and element waits
    pub fn new(page: Page, poller: Poller, wait: PollConfig) -> Self {
        Self {
            page,
            poller,
            wait,
            cookie_accept: Locator::new(COOKIE_ACCEPT),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn wait_config(&self) -> PollConfig {
        self.wait
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        self.page = page;
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        tracing::info!("Navigating to {}", url);
        self.page.goto(url).await?;
        self.wait_for_load().await
    }

    /// Wait for `document.readyState` to reach `complete`
    pub async fn wait_for_load(&self) -> Result<()> {
        let loaded = self
            .poller
            .wait_until(
                || async move {
                    let state: String = self
                        .page
                        .evaluate("document.readyState")
                        .await?
                        .into_value()
                        .map_err(|e| Error::Cdp(format!("Unexpected readyState value: {}", e)))?;
                    Ok::<_, Error>((state == "complete").then_some(()))
                },
                self.wait,
            )
            .await;

        loaded.ok_or_else(|| Error::WaitTimeout {
            what: "page load".to_string(),
            timeout_ms: self.wait.timeout().as_millis(),
        })
    }

    /// Click the consent banner if it shows up; returns whether it did
    pub async fn accept_cookies(&self) -> Result<bool> {
        let budget = PollConfig::new(CONSENT_TIMEOUT, CONSENT_INTERVAL)?;
        accept_consent(&self.poller, &self.cookie_accept.on(&self.page), budget).await
    }

    /// Fixed pause, for animations that have no completion signal
    pub async fn pause(&self, duration: Duration) {
        self.poller.clock().sleep(duration).await;
    }

    /// Whether some visible element contains `text`, whitespace-normalised
    pub async fn is_text_visible(&self, text: &str) -> Result<bool> {
        let visible: bool = self
            .page
            .evaluate(text_visibility_script(text)?)
            .await?
            .into_value()
            .map_err(|e| Error::Cdp(format!("Unexpected text probe value: {}", e)))?;
        Ok(visible)
    }

    /// Wait, within the page budget, for `text` to show up
    pub async fn wait_for_text(&self, text: &str) -> Result<bool> {
        let found = self
            .poller
            .wait_until(
                || async move { self.is_text_visible(text).await.map(|v| v.then_some(())) },
                self.wait,
            )
            .await;
        Ok(found.is_some())
    }
}

async fn accept_consent<C, T>(poller: &Poller<C>, banner: &T, budget: PollConfig) -> Result<bool>
where
    C: Clock,
    T: PollTarget<Error = Error>,
{
    match poller.poll_and_act(banner, budget).await? {
        PollOutcome::Acted => {
            tracing::debug!("Cookie consent accepted");
            Ok(true)
        }
        PollOutcome::TimedOut => {
            tracing::debug!(
                "No cookie banner within {}ms, consent already given",
                budget.timeout().as_millis()
            );
            Ok(false)
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the JS expression that looks for a visible element containing `text`
fn text_visibility_script(text: &str) -> Result<String> {
    let needle = serde_json::to_string(&normalize_whitespace(text))
        .map_err(|e| Error::Browser(format!("Cannot encode search text: {}", e)))?;

    Ok(format!(
        r#"(() => {{
    const needle = {needle};
    for (const el of document.querySelectorAll('body *')) {{
        const text = (el.innerText || '').replace(/\s+/g, ' ');
        if (!text.includes(needle)) {{
            continue;
        }}
        const rect = el.getBoundingClientRect();
        if (rect.width > 0 && rect.height > 0 && window.getComputedStyle(el).visibility !== 'hidden') {{
            return true;
        }}
    }}
    return false;
}})()"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Consent banner that shows up after `shown_after` checks, or never
    struct Banner {
        shown_after: Option<u32>,
        checks: AtomicU32,
        clicks: AtomicU32,
    }

    impl Banner {
        fn new(shown_after: Option<u32>) -> Self {
            Self {
                shown_after,
                checks: AtomicU32::new(0),
                clicks: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PollTarget for Banner {
        type Error = Error;

        async fn is_ready(&self) -> Result<bool> {
            let seen = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
            match self.shown_after {
                Some(after) => Ok(seen > after),
                None => Err(Error::ElementNotFound(COOKIE_ACCEPT.to_string())),
            }
        }

        async fn act(&self) -> Result<()> {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn budget() -> PollConfig {
        PollConfig::new(CONSENT_TIMEOUT, CONSENT_INTERVAL).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_banner_means_consent_already_given() {
        let banner = Banner::new(None);
        let started = tokio::time::Instant::now();

        let accepted = accept_consent(&Poller::new(), &banner, budget()).await.unwrap();

        assert!(!accepted);
        assert_eq!(banner.clicks.load(Ordering::SeqCst), 0);
        assert_eq!(started.elapsed(), CONSENT_TIMEOUT);
        // One check at the start plus one per interval
        assert_eq!(banner.checks.load(Ordering::SeqCst), 21);
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_is_clicked_once_it_appears() {
        let banner = Banner::new(Some(3));

        let accepted = accept_consent(&Poller::new(), &banner, budget()).await.unwrap();

        assert!(accepted);
        assert_eq!(banner.clicks.load(Ordering::SeqCst), 1);
        assert_eq!(banner.checks.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  2 dorosłych,\n\t1 dziecko "),
            "2 dorosłych, 1 dziecko"
        );
    }

    #[test]
    fn test_text_script_embeds_escaped_needle() {
        let script = text_visibility_script("Say \"hi\"\n  there").unwrap();
        assert!(script.contains(r#"const needle = "Say \"hi\" there";"#));
        assert!(script.starts_with("(() => {"));
        assert!(script.ends_with("})()"));
    }
}
