//! WebDriver-backed browser session
//!
//! Talks to chromedriver or geckodriver through `fantoccini`. The driver
//! process itself is managed by [`crate::process`] or run externally.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::BrowserKind;
use crate::error::E2eResult;
use crate::session::{BrowserSession, Locator};

/// A live WebDriver session
#[derive(Clone)]
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Open a new session against a running WebDriver server
    pub async fn connect(
        webdriver_url: &str,
        browser: BrowserKind,
        headless: bool,
    ) -> E2eResult<Self> {
        info!("Opening {} session via {}", browser.as_str(), webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(capabilities(browser, headless))
            .connect(webdriver_url)
            .await?;

        Ok(Self { client })
    }

    async fn find_in(
        &self,
        parent: Option<&Element>,
        locator: Locator<'_>,
    ) -> E2eResult<Vec<Element>> {
        let css;
        let search = match locator {
            Locator::Id(id) => fantoccini::Locator::Id(id),
            Locator::ClassName(class) => {
                css = format!(".{}", class);
                fantoccini::Locator::Css(&css)
            }
            Locator::TagName(tag) => fantoccini::Locator::Css(tag),
            Locator::Css(selector) => fantoccini::Locator::Css(selector),
            Locator::XPath(xpath) => fantoccini::Locator::XPath(xpath),
        };

        let found = match parent {
            Some(element) => element.find_all(search).await?,
            None => self.client.find_all(search).await?,
        };
        Ok(found)
    }
}

/// Session capabilities for `browser`
///
/// Insecure certificates are accepted because the site under test usually
/// runs on a local development certificate.
pub fn capabilities(browser: BrowserKind, headless: bool) -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!(browser.as_str()));
    caps.insert("acceptInsecureCerts".to_string(), json!(true));

    match browser {
        BrowserKind::Chrome => {
            let mut args = vec!["--window-size=1280,720"];
            if headless {
                args.push("--headless=new");
            }
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }

    caps
}

/// A missing element is "not there yet", every other error is a real failure
fn present<T>(result: Result<T, CmdError>) -> E2eResult<Option<T>> {
    match result {
        Ok(found) => Ok(Some(found)),
        Err(e) if e.is_no_such_element() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> E2eResult<()> {
        debug!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.client.title().await?)
    }

    async fn page_source(&self) -> E2eResult<String> {
        Ok(self.client.source().await?)
    }

    async fn find(&self, locator: Locator<'_>) -> E2eResult<Option<Element>> {
        let search = match locator {
            Locator::Id(id) => fantoccini::Locator::Id(id),
            Locator::Css(selector) | Locator::TagName(selector) => {
                fantoccini::Locator::Css(selector)
            }
            Locator::XPath(xpath) => fantoccini::Locator::XPath(xpath),
            Locator::ClassName(_) => {
                return Ok(self.find_in(None, locator).await?.into_iter().next());
            }
        };

        present(self.client.find(search).await)
    }

    async fn find_all(&self, locator: Locator<'_>) -> E2eResult<Vec<Element>> {
        self.find_in(None, locator).await
    }

    async fn find_children(
        &self,
        parent: &Element,
        locator: Locator<'_>,
    ) -> E2eResult<Vec<Element>> {
        self.find_in(Some(parent), locator).await
    }

    async fn attribute(&self, element: &Element, name: &str) -> E2eResult<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn text(&self, element: &Element) -> E2eResult<String> {
        Ok(element.text().await?)
    }

    async fn tag_name(&self, element: &Element) -> E2eResult<String> {
        Ok(element.tag_name().await?)
    }

    async fn is_displayed(&self, element: &Element) -> E2eResult<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn is_enabled(&self, element: &Element) -> E2eResult<bool> {
        Ok(element.is_enabled().await?)
    }

    async fn click(&self, element: &Element) -> E2eResult<()> {
        element.click().await?;
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn quit(&self) -> E2eResult<()> {
        debug!("Closing WebDriver session");
        self.client.clone().close().await?;
        Ok(())
    }
}
