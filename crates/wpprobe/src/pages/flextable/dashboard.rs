//! FlexTable admin screens: dashboard, table builder and table settings.

use crate::locator::{AriaRole, Locator, Selector};
use crate::page_object::PageObject;
use crate::pages::SLOW_ELEMENT;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::{ElementState, LoadState};
use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit run pattern compiles"));

/// First run of digits in a shortcode label such as `[gswpts_table id=42]`
#[must_use]
pub fn extract_shortcode(label: &str) -> Option<String> {
    DIGIT_RUN.find(label).map(|m| m.as_str().to_string())
}

/// `admin.php?page=gswpts-dashboard`
#[derive(Debug, Clone)]
pub struct FlexTablePage {
    session: Session,
}

impl PageObject for FlexTablePage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        "page=gswpts-dashboard"
    }
}

impl FlexTablePage {
    /// Create the page object
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
        }
    }

    fn menu() -> Locator {
        Locator::from_selector(Selector::text("FlexTable")).first()
    }

    fn saved_notice() -> Locator {
        Locator::from_selector(Selector::text_is("Settings saved successfully."))
            .with_timeout(SLOW_ELEMENT)
    }

    fn edit_link() -> Locator {
        Locator::new("div[class='tooltip-wrapper'] a[class='table-edit']").first()
    }

    fn customization_tab() -> Locator {
        Locator::from_selector(Selector::text_is("3. Table customization")).with_timeout(SLOW_ELEMENT)
    }

    fn shortcode_button() -> Locator {
        Locator::new("button.copy-shortcode.btn-shortcode")
            .visible_only()
            .first()
    }

    async fn click_and_settle(&self, locator: &Locator) -> ProbeResult<()> {
        self.session.click(locator).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    async fn open_submenu(&self, entry: &Locator) -> ProbeResult<()> {
        self.session.hover(&Self::menu()).await?;
        self.session.wait_for(entry, ElementState::Visible).await?;
        self.click_and_settle(entry).await
    }

    /// Hover the admin menu and open the FlexTable dashboard
    pub async fn navigate_to_dashboard(&self) -> ProbeResult<()> {
        self.open_submenu(&Locator::new("a[href='admin.php?page=gswpts-dashboard#/doc']"))
            .await
    }

    /// Whether the dashboard call-to-action is shown
    pub async fn verify_dashboard_loaded(&self) -> ProbeResult<bool> {
        let heading = self.session.text_content(&Locator::new(".cta-title")).await?;
        Ok(heading.contains("Get started with your first table"))
    }

    /// Start the table builder
    pub async fn click_create_new_table(&self) -> ProbeResult<()> {
        self.click_and_settle(&Selector::role(AriaRole::Button, "Create new table").into())
            .await
    }

    /// Paste the source spreadsheet URL
    pub async fn fill_google_sheet_url(&self, url: &str) -> ProbeResult<()> {
        let input = Selector::role(AriaRole::Textbox, "Paste your Google Sheet URL here").into();
        self.session.fill(&input, url).await
    }

    /// Import the spreadsheet
    pub async fn create_table_from_url(&self) -> ProbeResult<()> {
        self.click_and_settle(&Selector::role(AriaRole::Button, "Create table from URL").into())
            .await
    }

    /// Name and describe the table
    pub async fn fill_table_details(&self, title: &str, description: &str) -> ProbeResult<()> {
        let name = Locator::new("#table-name").with_timeout(SLOW_ELEMENT);
        self.session.fill(&name, title).await?;
        self.session.fill(&Locator::new("#table-description"), description).await
    }

    /// Click "Save changes"
    pub async fn save_changes(&self) -> ProbeResult<()> {
        self.click_and_settle(&Selector::role(AriaRole::Button, "Save changes").into())
            .await
    }

    /// The save confirmation toast is shown
    pub async fn verify_saved_successfully(&self) -> ProbeResult<()> {
        self.session
            .expect_contains_text(&Self::saved_notice(), "Settings saved successfully.")
            .await
    }

    /// Click the FlexTable menu entry
    pub async fn return_to_dashboard(&self) -> ProbeResult<()> {
        self.click_and_settle(&Self::menu()).await
    }

    /// The newest table in the list carries `expected_title`, byte for byte
    pub async fn verify_table_title(&self, expected_title: &str) -> ProbeResult<()> {
        let title = Locator::new("a[class='table-edit'] h4[class='swptls-title h4']")
            .nth(0)
            .with_timeout(SLOW_ELEMENT);
        self.session.expect_text(&title, expected_title).await
    }

    /// Numeric id from the first visible shortcode button
    pub async fn get_shortcode_value(&self) -> ProbeResult<String> {
        let label = self.session.text_content(&Self::shortcode_button()).await?;
        let shortcode = extract_shortcode(&label).ok_or_else(|| {
            ProbeError::assertion("shortcode label contains an id", "a run of digits", &label)
        })?;
        tracing::info!(shortcode = %shortcode, "shortcode extracted");
        Ok(shortcode)
    }

    /// Hover the admin menu and open "All Tables"
    pub async fn navigate_to_all_tables(&self) -> ProbeResult<()> {
        self.open_submenu(&Locator::from_selector(Selector::text_is("All Tables")))
            .await
    }

    /// Whether the all-tables header is shown
    pub async fn verify_all_tables_page_loaded(&self) -> ProbeResult<bool> {
        let header = self.session.text_content(&Locator::new(".header-title")).await?;
        Ok(header.contains("All Tables"))
    }

    /// Open the first table's settings
    pub async fn navigate_to_table_edit_page(&self) -> ProbeResult<()> {
        self.session.click(&Self::edit_link()).await?;
        self.session
            .wait_for(&Self::customization_tab(), ElementState::Visible)
            .await
            .map(|_| ())
    }

    /// Switch to the customization tab
    pub async fn navigate_to_table_customization(&self) -> ProbeResult<()> {
        self.session.click(&Self::customization_tab()).await?;
        self.session
            .wait_for(&Locator::new("#show-title").with_timeout(SLOW_ELEMENT), ElementState::Attached)
            .await
            .map(|_| ())
    }

    /// Toggle "Show table title"
    pub async fn enable_show_table_title(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new("#show-title")).await
    }

    /// Toggle "Show table description"
    pub async fn enable_show_table_description(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new("#show-description")).await?;
        self.session
            .wait_for(&Locator::new("#description-position"), ElementState::Visible)
            .await
            .map(|_| ())
    }

    /// Render the description below the table
    pub async fn set_description_position_below(&self) -> ProbeResult<()> {
        let position = Locator::new("#description-position");
        self.session.select_option(&position, "below").await?;
        self.session.expect_value(&position, "below").await
    }

    /// The "Table bottom elements" section is shown
    pub async fn verify_table_bottom_elements(&self) -> ProbeResult<()> {
        let heading = Selector::role(AriaRole::Heading, "Table bottom elements").into();
        self.session.expect_visible(&heading).await
    }

    /// Toggle "Show entry info"
    pub async fn enable_entry_info(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new("#hide-entry-info")).await
    }

    /// Toggle "Show pagination"
    pub async fn enable_pagination(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new("#hide-pagination")).await
    }

    /// Switch to the styling sub-tab
    pub async fn navigate_to_styling_tab(&self) -> ProbeResult<()> {
        self.session
            .click(&Locator::from_selector(Selector::text_is("Styling")))
            .await?;
        self.session
            .wait_for(&Locator::new("#rows-per-page").with_timeout(SLOW_ELEMENT), ElementState::Attached)
            .await
            .map(|_| ())
    }

    /// Pick the rows-per-page option
    pub async fn set_rows_per_page(&self, value: &str) -> ProbeResult<()> {
        let rows = Locator::new("#rows-per-page");
        self.session.scroll_into_view(&rows).await?;
        self.session.select_option(&rows, value).await?;
        self.session.expect_value(&rows, value).await
    }

    /// Pick the table height option
    pub async fn set_table_height(&self, height: &str) -> ProbeResult<()> {
        let select = Locator::new("#table_height");
        self.session.select_option(&select, height).await?;
        self.session.expect_value(&select, height).await
    }

    /// Click the delete icon of the table
    pub async fn delete_table(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new(".table-delete").first()).await
    }

    /// Confirm the deletion popup
    pub async fn confirm_delete(&self) -> ProbeResult<()> {
        let popup = Locator::from_selector(Selector::text_is("Are you sure to delete the table?"));
        self.session.expect_visible(&popup).await?;
        self.click_and_settle(&Locator::from_selector(Selector::text_is("Delete")))
            .await
    }

    /// The empty-state message is shown
    pub async fn verify_table_deleted_from_backend(&self) -> ProbeResult<()> {
        let intro = Locator::new(".no-tables-created-intro p")
            .first()
            .with_timeout(SLOW_ELEMENT);
        self.session
            .expect_contains_text(&intro, "Click the button below to create your first table!")
            .await
    }
}
