use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::element::Element;
use offercheck_core::PollTarget;

/// Visible means attached, rendered with a non-empty box and not disabled
const VISIBILITY_PROBE: &str = r#"function() {
    if (!this.isConnected || this.disabled) {
        return false;
    }
    const style = window.getComputedStyle(this);
    if (style.visibility === 'hidden' || style.display === 'none') {
        return false;
    }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

/// A located DOM element that the poller can wait on and click
pub struct ElementTarget {
    element: Element,
    selector: String,
}

impl ElementTarget {
    pub fn new(element: Element, selector: impl Into<String>) -> Self {
        Self {
            element,
            selector: selector.into(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Rendered text, trimmed; empty when the element has none
    pub async fn text(&self) -> Result<String> {
        let text = self.element.inner_text().await?;
        Ok(text.map(|t| t.trim().to_string()).unwrap_or_default())
    }

    pub async fn click(&self) -> Result<()> {
        tracing::debug!("Clicking {}", self.selector);
        self.element.click().await.map_err(|e| {
            Error::Cdp(format!("Failed to click '{}': {}", self.selector, e))
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for ElementTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementTarget")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PollTarget for ElementTarget {
    type Error = Error;

    async fn is_ready(&self) -> Result<bool> {
        let returns = self.element.call_js_fn(VISIBILITY_PROBE, false).await?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    async fn act(&self) -> Result<()> {
        self.click().await
    }
}
