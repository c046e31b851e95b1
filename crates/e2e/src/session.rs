//! Browser session seam
//!
//! Checks and waits talk to the browser only through [`BrowserSession`]. The
//! session is owned by the caller and passed in explicitly; nothing here keeps
//! a global driver around.

use async_trait::async_trait;
use std::fmt;

use crate::error::E2eResult;

/// How to find an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    Id(&'a str),
    ClassName(&'a str),
    TagName(&'a str),
    Css(&'a str),
    XPath(&'a str),
}

impl fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::ClassName(class) => write!(f, "class={}", class),
            Locator::TagName(tag) => write!(f, "tag={}", tag),
            Locator::Css(css) => write!(f, "css={}", css),
            Locator::XPath(xpath) => write!(f, "xpath={}", xpath),
        }
    }
}

/// Read and interact with a live page
///
/// `find` reports a missing element as `Ok(None)`; errors are reserved for a
/// broken observation channel (driver gone, stale handle, script failure).
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Handle to an element on the current page
    type Element: Clone + Send + Sync;

    async fn navigate(&self, url: &str) -> E2eResult<()>;

    async fn title(&self) -> E2eResult<String>;

    async fn page_source(&self) -> E2eResult<String>;

    async fn find(&self, locator: Locator<'_>) -> E2eResult<Option<Self::Element>>;

    async fn find_all(&self, locator: Locator<'_>) -> E2eResult<Vec<Self::Element>>;

    /// Search below `parent` only
    async fn find_children(
        &self,
        parent: &Self::Element,
        locator: Locator<'_>,
    ) -> E2eResult<Vec<Self::Element>>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> E2eResult<Option<String>>;

    async fn text(&self, element: &Self::Element) -> E2eResult<String>;

    async fn tag_name(&self, element: &Self::Element) -> E2eResult<String>;

    async fn is_displayed(&self, element: &Self::Element) -> E2eResult<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> E2eResult<bool>;

    async fn click(&self, element: &Self::Element) -> E2eResult<()>;

    /// Run a synchronous script in the page; `args` are exposed as `arguments`
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> E2eResult<serde_json::Value>;

    /// End the session. The handle must not be used afterwards.
    async fn quit(&self) -> E2eResult<()>;
}
