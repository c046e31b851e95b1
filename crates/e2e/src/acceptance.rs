//! Acceptance checks for the GreenLight home view
//!
//! One check per user-visible behaviour of the page. Each check runs against
//! a freshly prepared session (see [`HomeView::prepare`]) and either returns
//! `Ok(())` or the first failed expectation.

use greenlight_poll::PollPolicy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::session::{BrowserSession, Locator};
use crate::views::{self, HomeViewModel};
use crate::waits::{wait_for_attribute_contains, wait_for_element};

/// Checks of the home view, in the order the suite runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HomeCheck {
    ViewExists,
    RegistrationFormPresented,
    StoplightContainer,
    HealthDeclarationContainer,
    ThirdContainer,
    StoplightGreenAfterAccept,
    StoplightRedAfterDecline,
    AcceptElementDisplayed,
    DeclineElementDisplayed,
}

impl HomeCheck {
    pub const ALL: [HomeCheck; 9] = [
        HomeCheck::ViewExists,
        HomeCheck::RegistrationFormPresented,
        HomeCheck::StoplightContainer,
        HomeCheck::HealthDeclarationContainer,
        HomeCheck::ThirdContainer,
        HomeCheck::StoplightGreenAfterAccept,
        HomeCheck::StoplightRedAfterDecline,
        HomeCheck::AcceptElementDisplayed,
        HomeCheck::DeclineElementDisplayed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HomeCheck::ViewExists => "home-view-exists",
            HomeCheck::RegistrationFormPresented => "registration-form-presented",
            HomeCheck::StoplightContainer => "stoplight-container",
            HomeCheck::HealthDeclarationContainer => "health-declaration-container",
            HomeCheck::ThirdContainer => "third-container",
            HomeCheck::StoplightGreenAfterAccept => "stoplight-green-after-accept",
            HomeCheck::StoplightRedAfterDecline => "stoplight-red-after-decline",
            HomeCheck::AcceptElementDisplayed => "accept-element-displayed",
            HomeCheck::DeclineElementDisplayed => "decline-element-displayed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.name() == name)
    }

    pub async fn run<S: BrowserSession>(&self, view: &HomeView<'_, S>) -> E2eResult<()> {
        debug!("Running check {}", self.name());
        match self {
            HomeCheck::ViewExists => view.view_exists().await,
            HomeCheck::RegistrationFormPresented => view.registration_form_presented().await,
            HomeCheck::StoplightContainer => view.stoplight_container().await,
            HomeCheck::HealthDeclarationContainer => view.health_declaration_container().await,
            HomeCheck::ThirdContainer => view.third_container().await,
            HomeCheck::StoplightGreenAfterAccept => {
                view.stoplight_after_click(&view.model.accept_id, views::GREEN)
                    .await
            }
            HomeCheck::StoplightRedAfterDecline => {
                view.stoplight_after_click(&view.model.decline_id, views::RED)
                    .await
            }
            HomeCheck::AcceptElementDisplayed => {
                view.element_displayed(&view.model.accept_id).await
            }
            HomeCheck::DeclineElementDisplayed => {
                view.element_displayed(&view.model.decline_id).await
            }
        }
    }
}

/// The home view as seen through a browser session
pub struct HomeView<'a, S: BrowserSession> {
    session: &'a S,
    model: HomeViewModel,
    policy: PollPolicy,
}

impl<'a, S: BrowserSession> HomeView<'a, S> {
    pub fn new(session: &'a S, policy: PollPolicy) -> Self {
        Self {
            session,
            model: HomeViewModel::default(),
            policy,
        }
    }

    pub fn with_model(mut self, model: HomeViewModel) -> Self {
        self.model = model;
        self
    }

    /// Open the site with no registered user
    pub async fn prepare(&self, site_url: &str) -> E2eResult<()> {
        self.session.navigate(site_url).await?;
        self.session
            .execute_script(
                "localStorage.setItem(arguments[0], '');",
                vec![json!(views::FIRST_NAME_LAST_NAME_KEY)],
            )
            .await?;
        Ok(())
    }

    pub async fn view_exists(&self) -> E2eResult<()> {
        let title = self.session.title().await?;
        ensure(title == views::PAGE_TITLE, || {
            format!("title is {:?}, expected {:?}", title, views::PAGE_TITLE)
        })?;

        let source = self.session.page_source().await?;
        ensure(source.contains(views::BANNER_TEXT), || {
            format!("page does not mention {:?}", views::BANNER_TEXT)
        })
    }

    /// The form is rendered client-side, so it may show up a little late
    pub async fn registration_form_presented(&self) -> E2eResult<()> {
        let form = wait_for_element(
            self.session,
            Locator::Id(views::REGISTRATION_FORM_ID),
            self.policy.clone(),
        )
        .await?;
        self.ensure_usable(&form, views::REGISTRATION_FORM_ID).await
    }

    /// First section: the stoplight wrapping the QR code
    pub async fn stoplight_container(&self) -> E2eResult<()> {
        let container = self.container(1).await?;

        let mut stoplight_found = false;
        for child in self.session.find_children(&container, Locator::XPath(".//*")).await? {
            if !self.has_tag(&child, "span").await? {
                continue;
            }
            self.ensure_usable(&child, "stoplight").await?;
            let classes = self.session.attribute(&child, "class").await?.unwrap_or_default();
            ensure(classes.contains(views::STOPLIGHT_CLASS), || {
                format!("span has classes {:?}, expected {:?}", classes, views::STOPLIGHT_CLASS)
            })?;
            stoplight_found = true;

            for image in self.session.find_children(&child, Locator::XPath(".//*")).await? {
                ensure(self.has_tag(&image, "img").await?, || {
                    "stoplight contains something other than an image".to_string()
                })?;
                let src = self.session.attribute(&image, "src").await?.unwrap_or_default();
                ensure(src.contains(views::QR_CODE_IMAGE), || {
                    format!("stoplight image is {:?}, expected {:?}", src, views::QR_CODE_IMAGE)
                })?;
            }
        }

        ensure(stoplight_found, || "no stoplight in the first container".to_string())
    }

    /// Second section: declaration header, paragraph and the two buttons
    pub async fn health_declaration_container(&self) -> E2eResult<()> {
        let container = self.container(2).await?;

        let mut header_found = false;
        let mut paragraph_found = false;
        let mut accept_found = false;
        let mut decline_found = false;

        for child in self.session.find_children(&container, Locator::XPath(".//*")).await? {
            let tag = self.session.tag_name(&child).await?.to_ascii_lowercase();
            let text = self.session.text(&child).await?;

            let matched = match tag.as_str() {
                "h3" if text == self.model.health_declaration_header => {
                    header_found = true;
                    true
                }
                "p" if text == self.model.health_declaration_paragraph => {
                    paragraph_found = true;
                    true
                }
                "button" if text.contains(&self.model.accept_text) => {
                    accept_found = true;
                    true
                }
                "button" if text == self.model.decline_text => {
                    decline_found = true;
                    true
                }
                _ => false,
            };

            if matched {
                self.ensure_usable(&child, &tag).await?;
            }
        }

        ensure(header_found, || "health declaration header missing".to_string())?;
        ensure(paragraph_found, || "health declaration paragraph missing".to_string())?;
        ensure(accept_found, || "accept button missing".to_string())?;
        ensure(decline_found, || "decline button missing".to_string())
    }

    pub async fn third_container(&self) -> E2eResult<()> {
        self.container(3).await.map(|_| ())
    }

    /// Click `button_id` and wait for the stoplight to turn `color`
    pub async fn stoplight_after_click(&self, button_id: &str, color: &str) -> E2eResult<()> {
        let stoplight = self.require(Locator::Id(&self.model.stoplight_id)).await?;
        let button = self.require(Locator::Id(button_id)).await?;

        self.session.click(&button).await?;

        wait_for_attribute_contains(self.session, &stoplight, "class", color, self.policy.clone())
            .await
            .map(|_| ())
    }

    pub async fn element_displayed(&self, id: &str) -> E2eResult<()> {
        let element = self.require(Locator::Id(id)).await?;
        ensure(self.session.is_displayed(&element).await?, || {
            format!("#{} is not displayed", id)
        })
    }

    /// Section `n` (1-based), visible and carrying its layout classes
    async fn container(&self, n: usize) -> E2eResult<S::Element> {
        let id = views::CONTAINER_IDS[n - 1];
        let container = self.require(Locator::Id(id)).await?;
        self.ensure_usable(&container, id).await?;

        let classes = self.session.attribute(&container, "class").await?.unwrap_or_default();
        let expected = views::container_class(n);
        ensure(has_all_classes(&classes, &expected), || {
            format!("#{} has classes {:?}, expected {:?}", id, classes, expected)
        })?;

        Ok(container)
    }

    async fn require(&self, locator: Locator<'_>) -> E2eResult<S::Element> {
        self.session
            .find(locator)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(locator.to_string()))
    }

    async fn has_tag(&self, element: &S::Element, tag: &str) -> E2eResult<bool> {
        Ok(self.session.tag_name(element).await?.eq_ignore_ascii_case(tag))
    }

    /// Displayed and enabled
    async fn ensure_usable(&self, element: &S::Element, what: &str) -> E2eResult<()> {
        ensure(self.session.is_displayed(element).await?, || {
            format!("{} is not displayed", what)
        })?;
        ensure(self.session.is_enabled(element).await?, || {
            format!("{} is not enabled", what)
        })
    }
}

fn ensure<F>(condition: bool, message: F) -> E2eResult<()>
where
    F: FnOnce() -> String,
{
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message()))
    }
}

/// Every class of `expected` appears in `classes`
fn has_all_classes(classes: &str, expected: &str) -> bool {
    expected
        .split_whitespace()
        .all(|want| classes.split_whitespace().any(|have| have == want))
}
