use crate::{ElementTarget, Error, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use offercheck_core::{Clock, PollConfig, PollTarget, Poller};

/// A CSS selector resolved against a page on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: String,
}

impl Locator {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// `[data-testid="..."]`, the site's stable hook for most controls
    pub fn test_id(id: &str) -> Self {
        Self::new(format!("[data-testid=\"{}\"]", id))
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Bind to `page` so the poller can wait for an element that may not exist yet
    pub fn on<'a>(&'a self, page: &'a Page) -> PageLocator<'a> {
        PageLocator {
            locator: self,
            page,
        }
    }

    /// Every element currently matching, in document order
    pub async fn all(&self, page: &Page) -> Result<Vec<ElementTarget>> {
        let elements = page.find_elements(self.selector.as_str()).await?;
        tracing::debug!("{} element(s) match {}", elements.len(), self.selector);

        Ok(elements
            .into_iter()
            .map(|element| ElementTarget::new(element, self.selector.clone()))
            .collect())
    }

    pub async fn first(&self, page: &Page) -> Result<ElementTarget> {
        page.find_element(self.selector.as_str())
            .await
            .map(|element| ElementTarget::new(element, self.selector.clone()))
            .map_err(|_| Error::ElementNotFound(self.selector.clone()))
    }

    /// Wait until the first match exists and is visible
    pub async fn wait_visible<C: Clock>(
        &self,
        page: &Page,
        poller: &Poller<C>,
        config: PollConfig,
    ) -> Result<ElementTarget> {
        let visible = poller
            .wait_until(
                || async move {
                    let target = self.first(page).await?;
                    let ready = target.is_ready().await?;
                    Ok::<_, Error>(ready.then_some(target))
                },
                config,
            )
            .await;

        visible.ok_or_else(|| Error::WaitTimeout {
            what: format!("'{}' to become visible", self.selector),
            timeout_ms: config.timeout().as_millis(),
        })
    }

    /// Click the first match once it is visible; a timeout is an error here
    pub async fn click<C: Clock>(
        &self,
        page: &Page,
        poller: &Poller<C>,
        config: PollConfig,
    ) -> Result<()> {
        let target = self.wait_visible(page, poller, config).await?;
        target.click().await
    }

    /// Text of the first match, trimmed; empty if there is no match
    pub async fn text(&self, page: &Page) -> Result<String> {
        match self.first(page).await {
            Ok(target) => target.text().await,
            Err(Error::ElementNotFound(_)) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }
}

/// A [`Locator`] resolved afresh on every readiness check
pub struct PageLocator<'a> {
    locator: &'a Locator,
    page: &'a Page,
}

#[async_trait]
impl PollTarget for PageLocator<'_> {
    type Error = Error;

    /// No match yet counts as not ready
    async fn is_ready(&self) -> Result<bool> {
        match self.locator.first(self.page).await {
            Ok(target) => target.is_ready().await,
            Err(Error::ElementNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn act(&self) -> Result<()> {
        self.locator.first(self.page).await?.click().await
    }
}
