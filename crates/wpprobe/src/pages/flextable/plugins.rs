//! Installed-plugins and add-plugin screens.

use crate::locator::{AriaRole, Locator, Selector};
use crate::page_object::PageObject;
use crate::pages::SLOW_ELEMENT;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::LoadState;

/// Listing title of the plugin in the wordpress.org directory
pub const PLUGIN_TITLE: &str = "FlexTable – Live WP table sync with Google Sheets";

/// Plugin author shown in the directory
pub const PLUGIN_AUTHOR: &str = "WPPOOL";

/// What the installed-plugins search reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    /// No installed plugin matched
    NotInstalled,
    /// Installed and active
    Active,
    /// Installed but inactive
    Inactive,
}

/// `plugins.php` and `plugin-install.php`
#[derive(Debug, Clone)]
pub struct PluginPage {
    session: Session,
}

impl PageObject for PluginPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        "plugins.php"
    }
}

impl PluginPage {
    /// Create the page object
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
        }
    }

    fn plugins_menu() -> Locator {
        Selector::role_exact(AriaRole::Link, "Plugins").into()
    }

    fn installed_search() -> Locator {
        Locator::new("#plugin-search-input")
    }

    fn result_count() -> Locator {
        Locator::new(".displaying-num").first()
    }

    fn deactivate_link() -> Locator {
        Locator::new("#deactivate-sheets-to-wp-table-live-sync")
    }

    fn activate_link() -> Locator {
        Locator::new("#activate-sheets-to-wp-table-live-sync")
    }

    fn activate_button() -> Locator {
        Locator::from_selector(Selector::role(AriaRole::Button, "Activate FlexTable"))
            .with_timeout(SLOW_ELEMENT)
    }

    fn welcome_heading() -> Locator {
        Locator::from_selector(Selector::role(AriaRole::Heading, "Welcome to WordPress!"))
            .with_timeout(SLOW_ELEMENT)
    }

    async fn click_and_settle(&self, locator: &Locator) -> ProbeResult<()> {
        self.session.click(locator).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    async fn search(&self, field: &Locator, name: &str) -> ProbeResult<()> {
        self.session.fill(field, name).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// Open the installed-plugins list from the admin menu
    pub async fn navigate_to_plugins(&self) -> ProbeResult<()> {
        self.click_and_settle(&Self::plugins_menu()).await
    }

    /// Filter the installed plugins
    pub async fn search_plugin(&self, name: &str) -> ProbeResult<()> {
        self.search(&Self::installed_search(), name).await
    }

    /// Result counter text, e.g. `1 item` or `0 items`
    pub async fn get_search_result(&self) -> ProbeResult<String> {
        self.session.text_content(&Self::result_count()).await
    }

    /// Classify the current search result
    pub async fn plugin_status(&self) -> ProbeResult<PluginStatus> {
        if self.get_search_result().await?.contains("0 items") {
            return Ok(PluginStatus::NotInstalled);
        }
        if self.is_plugin_active().await? {
            Ok(PluginStatus::Active)
        } else {
            Ok(PluginStatus::Inactive)
        }
    }

    /// Open the plugin directory
    pub async fn navigate_to_add_plugins(&self) -> ProbeResult<()> {
        self.click_and_settle(&Locator::new("a.page-title-action")).await
    }

    /// Search the plugin directory
    pub async fn search_plugin_in_repository(&self, name: &str) -> ProbeResult<()> {
        self.search(&Locator::new("#search-plugins"), name).await
    }

    /// The directory lists the plugin by title
    pub async fn verify_plugin_title(&self) -> ProbeResult<()> {
        let title = Locator::from_selector(Selector::css_with_text("a", PLUGIN_TITLE))
            .first()
            .with_timeout(SLOW_ELEMENT);
        self.session.expect_visible(&title).await
    }

    /// The directory lists the plugin author
    pub async fn verify_author(&self) -> ProbeResult<()> {
        let author = Locator::from_selector(Selector::css_with_text("a", PLUGIN_AUTHOR)).first();
        self.session.expect_visible(&author).await
    }

    /// Click "Install Now"
    pub async fn install_plugin(&self) -> ProbeResult<()> {
        self.click_and_settle(&Locator::new("a[aria-label^=\"Install FlexTable\"]"))
            .await
    }

    /// Installation finished and the activate button is offered
    pub async fn wait_for_activate_button(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::activate_button()).await
    }

    /// Activate from the directory screen
    pub async fn activate_plugin(&self) -> ProbeResult<()> {
        self.click_and_settle(&Self::activate_button()).await
    }

    /// Back to the installed-plugins list
    pub async fn navigate_to_installed_plugins(&self) -> ProbeResult<()> {
        self.navigate_to_plugins().await
    }

    /// Filter the installed plugins again after activation
    pub async fn search_installed_plugin(&self, name: &str) -> ProbeResult<()> {
        self.search_plugin(name).await
    }

    /// The deactivate link is shown, so the plugin is active
    pub async fn verify_plugin_activated(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::deactivate_link()).await
    }

    /// Whether the deactivate link is shown right now
    pub async fn is_plugin_active(&self) -> ProbeResult<bool> {
        self.session.is_visible(&Self::deactivate_link()).await
    }

    /// Click "Activate" on the installed-plugins list
    pub async fn activate_plugin_if_inactive(&self) -> ProbeResult<()> {
        self.click_and_settle(&Self::activate_link()).await
    }

    /// Open the WordPress dashboard from the admin menu
    pub async fn navigate_to_dashboard(&self) -> ProbeResult<()> {
        let dashboard = Locator::from_selector(Selector::text_is("Dashboard")).first();
        self.click_and_settle(&dashboard).await
    }

    /// The WordPress dashboard greets the user
    pub async fn verify_dashboard_loaded(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::welcome_heading()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::session::SessionConfig;

    #[tokio::test(start_paused = true)]
    async fn test_status_not_installed() {
        let mock = MockDriver::new();
        mock.set_one(&PluginPage::result_count(), MockElement::text("0 items"));
        let session = Session::new(mock, SessionConfig::default());
        let status = PluginPage::new(&session).plugin_status().await.unwrap();
        assert_eq!(status, PluginStatus::NotInstalled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_active_and_inactive() {
        let mock = MockDriver::new();
        mock.set_one(&PluginPage::result_count(), MockElement::text("1 item"));
        mock.set_one(&PluginPage::activate_link(), MockElement::text("Activate"));
        let session = Session::new(mock.clone(), SessionConfig::default());
        let page = PluginPage::new(&session);
        assert_eq!(page.plugin_status().await.unwrap(), PluginStatus::Inactive);

        let deactivate_key = PluginPage::deactivate_link().key();
        mock.on_click(&PluginPage::activate_link(), move |p| {
            p.set(deactivate_key.clone(), vec![MockElement::text("Deactivate")]);
        });
        page.activate_plugin_if_inactive().await.unwrap();
        assert_eq!(page.plugin_status().await.unwrap(), PluginStatus::Active);
        page.verify_plugin_activated().await.unwrap();
    }
}
