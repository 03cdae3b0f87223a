//! WordPress admin login screen.

use crate::locator::{AriaRole, Locator, Selector};
use crate::page_object::PageObject;
use crate::pages::{sandbox_continue_button, SANDBOX_PROBE, SLOW_ELEMENT};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::LoadState;

/// `wp-login.php`
#[derive(Debug, Clone)]
pub struct LoginPage {
    session: Session,
}

impl PageObject for LoginPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        "wp-login.php"
    }
}

impl LoginPage {
    /// Create the page object
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
        }
    }

    fn username_input() -> Locator {
        Selector::role(AriaRole::Textbox, "Username or Email Address").into()
    }

    fn password_input() -> Locator {
        Selector::role_exact(AriaRole::Textbox, "Password").into()
    }

    fn login_button() -> Locator {
        Selector::role(AriaRole::Button, "Log In").into()
    }

    fn welcome_heading() -> Locator {
        Locator::from_selector(Selector::role(AriaRole::Heading, "Welcome to WordPress!"))
            .with_timeout(SLOW_ELEMENT)
    }

    /// Open the admin URL and wait for the DOM
    pub async fn navigate_to_login(&self, url: &str) -> ProbeResult<()> {
        self.session.goto_until(url, LoadState::DomContentLoaded).await
    }

    /// Click through the sandbox interstitial if it shows up; returns whether
    /// it did
    pub async fn handle_sandbox_continue(&self) -> ProbeResult<bool> {
        let button = sandbox_continue_button();
        if !self.session.is_visible_within(&button, SANDBOX_PROBE).await? {
            return Ok(false);
        }
        self.session.click(&button).await?;
        self.session.wait_for_load_state(LoadState::NetworkIdle).await?;
        Ok(true)
    }

    /// Submit the login form and wait for the admin area
    pub async fn login(&self, username: &str, password: &str) -> ProbeResult<()> {
        self.session.fill(&Self::username_input(), username).await?;
        self.session.fill(&Self::password_input(), password).await?;
        self.session
            .click_and_wait_for_url(&Self::login_button(), "wp-admin")
            .await
    }

    /// The admin dashboard greets the user
    pub async fn verify_login_success(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::welcome_heading()).await?;
        self.session.wait_for_load_state(LoadState::NetworkIdle).await.map(|_| ())
    }
}
