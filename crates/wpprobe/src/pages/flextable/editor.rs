//! Pages list and block editor.

use crate::locator::{AriaRole, Locator, Selector};
use crate::page_object::PageObject;
use crate::pages::SLOW_ELEMENT;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::{ElementState, LoadState};
use serde::{Deserialize, Serialize};

/// First three columns of a rendered sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Column 1
    pub name: String,
    /// Column 2
    pub id: String,
    /// Column 3
    pub subject: String,
}

impl TableRow {
    /// Build a row from its three cells
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            subject: subject.into(),
        }
    }
}

/// `edit.php?post_type=page` and the Gutenberg editor
#[derive(Debug, Clone)]
pub struct PageEditorPage {
    session: Session,
}

impl PageObject for PageEditorPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        "post_type=page"
    }
}

impl PageEditorPage {
    /// Create the page object
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
        }
    }

    fn first_row_title() -> Locator {
        Locator::new("a.row-title").first()
    }

    fn publish_confirm() -> Locator {
        Locator::from_selector(Selector::xpath(
            "//button[@class='components-button editor-post-publish-button editor-post-publish-button__button is-primary is-compact']",
        ))
        .with_timeout(SLOW_ELEMENT)
    }

    fn view_pages() -> Locator {
        Locator::from_selector(Selector::label("View Pages")).with_timeout(SLOW_ELEMENT)
    }

    fn table_container(shortcode: &str) -> Locator {
        Locator::new(format!("div[id='{shortcode}']")).with_timeout(SLOW_ELEMENT)
    }

    fn cell(shortcode: &str, row: usize, column: usize) -> Locator {
        Self::table_container(shortcode)
            .locator(Selector::css(format!("tbody tr:nth-child({row})")))
            .locator(Selector::css(format!("td:nth-child({column})")))
    }

    /// Hover "Pages" and open "All Pages"
    pub async fn navigate_to_pages(&self) -> ProbeResult<()> {
        self.session
            .hover(&Selector::xpath("//div[normalize-space()='Pages']").into())
            .await?;
        let all_pages = Locator::from_selector(Selector::css_with_text("a", "All Pages"));
        self.session.wait_for(&all_pages, ElementState::Visible).await?;
        self.session.click(&all_pages).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// Open a blank page in the block editor
    pub async fn add_new_page(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new(".page-title-action")).await?;
        self.session
            .wait_for(
                &Locator::from_selector(Selector::label("Add title")).with_timeout(SLOW_ELEMENT),
                ElementState::Visible,
            )
            .await
            .map(|_| ())
    }

    /// Type the page title
    pub async fn fill_page_title(&self, title: &str) -> ProbeResult<()> {
        let field = Selector::label("Add title").into();
        self.session.click(&field).await?;
        self.session.fill(&field, title).await
    }

    /// Insert the FlexTable block through the block inserter
    pub async fn add_flex_table_block(&self) -> ProbeResult<()> {
        self.session.click(&Selector::label("Add block").into()).await?;
        let search = Locator::new("#components-search-control-0");
        self.session.click(&search).await?;
        self.session.fill(&search, "FlexTable").await?;
        let block = Locator::from_selector(Selector::css_with_text("span", "FlexTable")).first();
        self.session.click(&block).await
    }

    /// Pick the table with id `shortcode` in the block's picker
    pub async fn select_table(&self, shortcode: &str) -> ProbeResult<()> {
        self.session
            .click(&Selector::role(AriaRole::Button, "Choose Table").into())
            .await?;
        let picker = Locator::from_selector(Selector::label("Select Table")).with_timeout(SLOW_ELEMENT);
        self.session.select_option(&picker, shortcode).await?;
        self.session.expect_value(&picker, shortcode).await
    }

    /// Publish, then confirm in the pre-publish panel
    pub async fn publish_page(&self) -> ProbeResult<()> {
        self.session
            .click(&Locator::from_selector(Selector::text_is("Publish")))
            .await?;
        let confirm = Self::publish_confirm();
        self.session.wait_for(&confirm, ElementState::Visible).await?;
        self.session.click(&confirm).await?;
        self.session
            .wait_for(&Self::view_pages(), ElementState::Visible)
            .await
            .map(|_| ())
    }

    /// Leave the editor for the pages list
    pub async fn return_to_pages(&self) -> ProbeResult<()> {
        self.session.click(&Self::view_pages()).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// The newest page in the list is titled `expected`
    pub async fn verify_published_page_title(&self, expected: &str) -> ProbeResult<()> {
        self.session.expect_text(&Self::first_row_title(), expected).await
    }

    /// Open the published page on the frontend through its row action
    pub async fn open_published_page(&self, title: &str) -> ProbeResult<()> {
        self.session.hover(&Self::first_row_title()).await?;
        let view = Locator::new(format!("a[aria-label='View “{title}”']"));
        self.session.click(&view).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// The frontend heading is `expected`
    pub async fn verify_front_page_title(&self, expected: &str) -> ProbeResult<()> {
        self.session
            .expect_text(&Locator::new("h1.entry-title"), expected)
            .await
    }

    async fn cell_text(&self, shortcode: &str, row: usize, column: usize) -> ProbeResult<String> {
        let text = self.session.text_content(&Self::cell(shortcode, row, column)).await?;
        Ok(text.trim().to_string())
    }

    /// Trimmed first three cells of the first `rows` rows of the embedded
    /// table
    pub async fn extract_table_data(&self, shortcode: &str, rows: usize) -> ProbeResult<Vec<TableRow>> {
        let table = Self::table_container(shortcode);
        self.session.scroll_into_view(&table).await?;
        self.session.wait_for(&table, ElementState::Visible).await?;

        let mut extracted = Vec::with_capacity(rows);
        for row in 1..=rows {
            extracted.push(TableRow {
                name: self.cell_text(shortcode, row, 1).await?,
                id: self.cell_text(shortcode, row, 2).await?,
                subject: self.cell_text(shortcode, row, 3).await?,
            });
        }
        tracing::info!(shortcode, rows = extracted.len(), "table data extracted");
        Ok(extracted)
    }

    /// Trash the newest page via its row action
    pub async fn delete_page(&self) -> ProbeResult<()> {
        self.session.hover(&Self::first_row_title()).await?;
        let trash = Locator::new("a.submitdelete").first();
        self.session.wait_for(&trash, ElementState::Attached).await?;
        self.session.click(&trash).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// Open the trash view
    pub async fn go_to_trash(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new(".subsubsub .trash a")).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// Delete the trashed page `title` permanently
    pub async fn permanently_delete_page(&self, title: &str) -> ProbeResult<()> {
        self.session
            .hover(&Locator::from_selector(Selector::text_is(title)).first())
            .await?;
        let delete = Locator::new(".submitdelete").first();
        self.session.click(&delete).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// The trash is empty
    pub async fn verify_page_deleted_from_trash(&self) -> ProbeResult<()> {
        self.session
            .expect_contains_text(
                &Locator::new("td.colspanchange").with_timeout(SLOW_ELEMENT),
                "No pages found in Trash.",
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::session::SessionConfig;

    #[tokio::test(start_paused = true)]
    async fn test_extracts_trimmed_cells() {
        let mock = MockDriver::new();
        mock.set_one(&PageEditorPage::table_container("7"), MockElement::default());
        let sheet = [["Tahsin ", " 10", "CSE"], ["Arafat", "11", " EEE\n"]];
        for (r, row) in sheet.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                mock.set_one(&PageEditorPage::cell("7", r + 1, c + 1), MockElement::text(*value));
            }
        }
        let session = Session::new(mock, SessionConfig::default());
        let rows = PageEditorPage::new(&session).extract_table_data("7", 2).await.unwrap();
        assert_eq!(
            rows,
            vec![TableRow::new("Tahsin", "10", "CSE"), TableRow::new("Arafat", "11", "EEE")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_table_is_not_found() {
        let session = Session::new(MockDriver::new(), SessionConfig {
            element_timeout: std::time::Duration::from_millis(100),
            ..SessionConfig::default()
        });
        let err = PageEditorPage::new(&session).extract_table_data("9", 2).await.unwrap_err();
        assert_eq!(err.kind(), "element-not-found");
    }
}
