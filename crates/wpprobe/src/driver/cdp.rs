//! Chromium driver over the DevTools protocol.
//!
//! Element resolution happens in the page: each call evaluates the
//! locator's [`to_js`](Locator::to_js) expression and works on the first
//! resolved element. Pointer interactions go through real input events at
//! the element's centre so CSS `:hover` menus open.

use super::{BrowserConfig, PageDriver};
use crate::locator::{js_str, BoundingBox, Locator};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{DocumentState, DEFAULT_WAIT_TIMEOUT_MS};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Counts fetch and XHR requests so network idle can be observed
const REQUEST_TRACKER: &str = r"
(() => {
  if (window.__wpprobeInflight !== undefined) return;
  window.__wpprobeInflight = 0;
  const done = () => { window.__wpprobeInflight = Math.max(0, window.__wpprobeInflight - 1); };
  const origFetch = window.fetch;
  if (origFetch) {
    window.fetch = function (...args) {
      window.__wpprobeInflight += 1;
      return origFetch.apply(this, args).finally(done);
    };
  }
  const origSend = XMLHttpRequest.prototype.send;
  XMLHttpRequest.prototype.send = function (...args) {
    window.__wpprobeInflight += 1;
    this.addEventListener('loadend', done, { once: true });
    return origSend.apply(this, args);
  };
})();
";

/// A CDP request timeout during navigation is a navigation timeout
fn navigation_error(url: &str, err: CdpError) -> ProbeError {
    match err {
        CdpError::Timeout => ProbeError::NavigationTimeout {
            condition: format!("navigation to {url}"),
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
        },
        other => ProbeError::driver(format!("navigation to {url} failed: {other}")),
    }
}

#[derive(Debug, Deserialize)]
struct Probe {
    found: bool,
    #[serde(default)]
    value: serde_json::Value,
}

/// Page driver backed by a real Chromium instance
#[derive(Debug)]
pub struct CdpDriver {
    browser: CdpBrowser,
    page: CdpPage,
    handle: tokio::task::JoinHandle<()>,
}

impl CdpDriver {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if browser cannot be launched
    pub async fn launch(config: &BrowserConfig) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS));

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        if let Some(ref agent) = config.user_agent {
            builder = builder.arg(format!("--user-agent={agent}"));
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;
        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
            REQUEST_TRACKER,
        ))
        .await
        .map_err(|e| ProbeError::driver(e.to_string()))?;

        tracing::info!(
            headless = config.headless,
            width = config.viewport_width,
            height = config.viewport_height,
            "browser launched"
        );

        Ok(Self {
            browser,
            page,
            handle,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, expr: String) -> ProbeResult<T> {
        let result = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| ProbeError::driver(e.to_string()))
    }

    /// Evaluate `body` with `el` bound to the first target of `locator`
    async fn on_target<T: DeserializeOwned>(&self, locator: &Locator, body: &str) -> ProbeResult<T> {
        let expr = format!(
            "(() => {{ const el = ({})[0]; \
             if (!el) return {{ found: false }}; \
             const value = (() => {{ {body} }})(); \
             return {{ found: true, value: value === undefined ? null : value }}; }})()",
            locator.to_js()
        );
        let probe: Probe = self.eval(expr).await?;
        if !probe.found {
            return Err(ProbeError::ElementNotFound {
                locator: locator.to_string(),
                timeout_ms: 0,
            });
        }
        serde_json::from_value(probe.value).map_err(ProbeError::from)
    }

    async fn centre(&self, locator: &Locator) -> ProbeResult<Point> {
        let bbox: BoundingBox = self
            .on_target(
                locator,
                "el.scrollIntoView({ block: 'center', inline: 'center' }); \
                 const b = el.getBoundingClientRect(); \
                 return { x: b.x, y: b.y, width: b.width, height: b.height };",
            )
            .await?;
        Ok(Point::new(
            bbox.x + bbox.width / 2.0,
            bbox.y + bbox.height / 2.0,
        ))
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn goto(&mut self, url: &str) -> ProbeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| navigation_error(url, e))?;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn ready_state(&self) -> ProbeResult<DocumentState> {
        let state: String = self.eval("document.readyState".to_string()).await?;
        Ok(DocumentState::parse(&state))
    }

    async fn in_flight_requests(&self) -> ProbeResult<usize> {
        self.eval("window.__wpprobeInflight || 0".to_string()).await
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.eval(format!("({}).length", locator.to_js())).await
    }

    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        let expr = format!(
            "(() => {{ const el = ({})[0]; if (!el) return false; \
             const b = el.getBoundingClientRect(); const s = window.getComputedStyle(el); \
             return b.width > 0 && b.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }})()",
            locator.to_js()
        );
        self.eval(expr).await
    }

    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        self.on_target(locator, "return el.textContent;").await
    }

    async fn inner_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.on_target(locator, "return el.innerText || '';").await
    }

    async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        self.on_target(locator, "return el.value === undefined ? '' : String(el.value);")
            .await
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        self.on_target(locator, &format!("return el.getAttribute({});", js_str(name)))
            .await
    }

    async fn bounding_box(&self, locator: &Locator) -> ProbeResult<Option<BoundingBox>> {
        self.on_target(
            locator,
            "const b = el.getBoundingClientRect(); \
             if (b.width === 0 && b.height === 0) return null; \
             return { x: b.x + window.scrollX, y: b.y + window.scrollY, width: b.width, height: b.height };",
        )
        .await
    }

    async fn computed_style(&self, locator: &Locator, property: &str) -> ProbeResult<String> {
        self.on_target(
            locator,
            &format!(
                "return window.getComputedStyle(el).getPropertyValue({});",
                js_str(property)
            ),
        )
        .await
    }

    async fn selected_option_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.on_target(
            locator,
            "const o = el.selectedOptions && el.selectedOptions[0]; \
             return o ? o.textContent.trim() : '';",
        )
        .await
    }

    async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        let point = self.centre(locator).await?;
        self.page
            .click(point)
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        Ok(())
    }

    async fn hover(&mut self, locator: &Locator) -> ProbeResult<()> {
        let point = self.centre(locator).await?;
        self.page
            .move_mouse(point)
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        Ok(())
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let body = format!(
            "el.focus(); \
             if (el.isContentEditable) {{ el.textContent = {v}; }} else {{ \
               const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
               const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
               setter.call(el, {v}); }} \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return null;",
            v = js_str(value)
        );
        self.on_target::<Option<()>>(locator, &body).await?;
        Ok(())
    }

    async fn select_option(&mut self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let body = format!(
            "const o = Array.from(el.options || []).find(o => o.value === {v}); \
             if (!o) return false; \
             el.value = {v}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;",
            v = js_str(value)
        );
        let selected: bool = self.on_target(locator, &body).await?;
        if !selected {
            return Err(ProbeError::driver(format!(
                "option {value:?} not found in {locator}"
            )));
        }
        Ok(())
    }

    async fn scroll_into_view(&mut self, locator: &Locator) -> ProbeResult<()> {
        self.on_target::<Option<()>>(
            locator,
            "el.scrollIntoView({ block: 'center', inline: 'nearest' }); return null;",
        )
        .await?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> ProbeResult<()> {
        self.eval::<Option<()>>(
            "(() => { window.scrollTo(0, document.body.scrollHeight); return null; })()"
                .to_string(),
        )
        .await?;
        Ok(())
    }

    async fn close(&mut self) -> ProbeResult<()> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| ProbeError::driver(e.to_string()));
        self.handle.abort();
        tracing::info!("browser closed");
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_timeout_maps_to_taxonomy() {
        let err = navigation_error("https://shop.test/checkout/", CdpError::Timeout);
        assert_eq!(err.kind(), "navigation-timeout");
        assert!(err.to_string().contains("https://shop.test/checkout/"));
    }

    #[test]
    fn test_other_navigation_failures_stay_driver_errors() {
        let err = navigation_error(
            "https://shop.test/",
            CdpError::ChromeMessage("net::ERR_NAME_NOT_RESOLVED".to_string()),
        );
        assert_eq!(err.kind(), "driver");
    }
}
