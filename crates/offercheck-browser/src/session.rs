use crate::{Error, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use offercheck_core::{Clock, PollConfig, Poller};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BACKOFF: Duration = Duration::from_millis(500);

/// Chrome opens its initial tab shortly after the debugging port comes up
const FIRST_TAB_TIMEOUT: Duration = Duration::from_secs(2);
const FIRST_TAB_INTERVAL: Duration = Duration::from_millis(100);

/// A CDP connection to a running Chrome plus the page the flow is driving
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Connect to Chrome on `debugging_port`, retrying while it starts up
    pub async fn connect(debugging_port: u16) -> Result<Self> {
        let endpoint = format!("http://localhost:{}", debugging_port);
        tracing::info!("Connecting to Chrome on port {}", debugging_port);

        let (browser, mut handler) = {
            let mut remaining = CONNECT_ATTEMPTS;
            loop {
                tracing::debug!("Attempting CDP connection to {}...", endpoint);
                match Browser::connect(&endpoint).await {
                    Ok(connected) => break connected,
                    Err(e) => {
                        remaining -= 1;
                        if remaining == 0 {
                            return Err(Error::Cdp(format!(
                                "Failed to connect to Chrome after {} attempts: {}",
                                CONNECT_ATTEMPTS, e
                            )));
                        }
                        tracing::debug!(
                            "CDP connection attempt failed, retrying... ({} left)",
                            remaining
                        );
                        tokio::time::sleep(CONNECT_BACKOFF).await;
                    }
                }
            }
        };

        // Commands only complete while the handler is being polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let first_tab = PollConfig::new(FIRST_TAB_TIMEOUT, FIRST_TAB_INTERVAL)?;
        let page = match first_listed(&Poller::new(), first_tab, || browser.pages()).await {
            Some(page) => page,
            None => {
                tracing::debug!("Chrome has no tab yet, opening one");
                browser.new_page("about:blank").await?
            }
        };

        tracing::info!("CDP connection established");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// The page the flow currently drives
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub async fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.browser.pages().await?)
    }

    /// Make `page` the one later steps act on (e.g. a freshly opened tab)
    pub fn switch_to(&mut self, page: Page) {
        tracing::debug!("Switching to page {}", page.target_id().inner());
        self.page = page;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// First item `list` yields within `config`, listing again while it comes back empty
async fn first_listed<C, T, E, F, Fut>(
    poller: &Poller<C>,
    config: PollConfig,
    mut list: F,
) -> Option<T>
where
    C: Clock,
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Vec<T>, E>>,
{
    poller
        .wait_until(
            || {
                let listed = list();
                async move { listed.await.map(|items| items.into_iter().next()) }
            },
            config,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn first_tab() -> PollConfig {
        PollConfig::new(FIRST_TAB_TIMEOUT, FIRST_TAB_INTERVAL).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_the_first_tab() {
        let calls = AtomicU32::new(0);

        let found = first_listed(&Poller::new(), first_tab(), || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 4 {
                    Ok::<Vec<&str>, Error>(Vec::new())
                } else {
                    Ok(vec!["about:blank", "chrome://newtab"])
                }
            }
        })
        .await;

        assert_eq!(found, Some("about:blank"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_when_no_tab_appears() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let found = first_listed(&Poller::new(), first_tab(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<Vec<&str>, _>(Error::Cdp("target list unavailable".to_string())) }
        })
        .await;

        assert_eq!(found, None);
        assert_eq!(started.elapsed(), FIRST_TAB_TIMEOUT);
        assert_eq!(calls.load(Ordering::SeqCst), 21);
    }
}
