//! Published table as a visitor sees it.

use crate::assertion::{assert_below, Assertion};
use crate::locator::{Locator, Selector};
use crate::money::parse_leading_int;
use crate::page_object::PageObject;
use crate::pages::SLOW_ELEMENT;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::ElementState;

/// Path segment WordPress derives from a page title:
/// `"Flex Table Data"` → `"flex-table-data"`
#[must_use]
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// `{base_url}/{slug}/`
#[derive(Debug, Clone)]
pub struct FrontendPage {
    session: Session,
    base_url: String,
    slug: String,
}

impl PageObject for FrontendPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        &self.slug
    }
}

impl FrontendPage {
    /// Frontend of the page titled `page_title` under `base_url`
    #[must_use]
    pub fn new(session: &Session, base_url: &str, page_title: &str) -> Self {
        Self {
            session: session.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            slug: slugify(page_title),
        }
    }

    /// URL of the published page
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("{}/{}/", self.base_url, self.slug)
    }

    fn title() -> Locator {
        Locator::new(".swptls-table-title")
    }

    fn wrapper() -> Locator {
        Locator::new("#create_tables_wrapper").with_timeout(SLOW_ELEMENT)
    }

    fn scroll_area() -> Locator {
        Locator::new(".dataTables_scroll")
    }

    fn entry_info() -> Locator {
        Locator::new("#create_tables_info")
    }

    /// Open the published page
    pub async fn navigate_to_table_page(&self) -> ProbeResult<()> {
        self.session.goto(&self.page_url()).await
    }

    /// Title and table are both rendered
    pub async fn verify_table_title_visible(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::title()).await?;
        self.session.expect_visible(&Self::wrapper()).await
    }

    /// The title's top edge is above the table's
    pub async fn verify_table_title_above_table(&self) -> ProbeResult<()> {
        let title = self.session.bounding_box(&Self::title()).await?;
        let table = self.session.bounding_box(&Self::wrapper()).await?;
        Assertion::above("table title above table", &title, &table).into_result()
    }

    /// The description's top edge is below the table's
    pub async fn verify_table_description_below_table(&self) -> ProbeResult<()> {
        let description = Locator::new("#swptls-table-description");
        self.session.scroll_into_view(&description).await?;
        self.session.expect_visible(&description).await?;
        assert_below(&self.session, &description, &Self::wrapper()).await
    }

    /// Entry info is rendered below the table body
    pub async fn verify_entry_info_visible(&self) -> ProbeResult<()> {
        let info = Self::entry_info();
        self.session.scroll_into_view(&info).await?;
        self.session.wait_for(&info, ElementState::Stable).await?;
        assert_below(&self.session, &info, &Self::scroll_area()).await
    }

    /// Pagination is rendered below the table body
    pub async fn verify_pagination_visible(&self) -> ProbeResult<()> {
        assert_below(&self.session, &Locator::new("#create_tables_paginate"), &Self::scroll_area()).await
    }

    async fn paginate(&self, control: &Locator) -> ProbeResult<()> {
        let info = Self::entry_info();
        let before = self.session.text_content(&info).await?;
        self.session.click(control).await?;
        let condition = format!("{info} to change from {before:?}");
        self.session
            .wait_for_condition(&condition, || {
                let info = info.clone();
                let before = before.clone();
                async move { Ok(self.session.text_content(&info).await? != before) }
            })
            .await?;
        tracing::debug!(control = %control, "table page changed");
        Ok(())
    }

    /// Click "Next" and wait for the entry info to change
    pub async fn click_pagination_next(&self) -> ProbeResult<()> {
        self.paginate(&Locator::from_selector(Selector::css_with_text("span", "Next")))
            .await
    }

    /// Click "Previous" and wait for the entry info to change
    pub async fn click_pagination_previous(&self) -> ProbeResult<()> {
        self.paginate(&Locator::from_selector(Selector::css_with_text("span", "Previous")))
            .await
    }

    /// Click the pagination button whose text is exactly `page`
    pub async fn click_pagination_page(&self, page: u32) -> ProbeResult<()> {
        self.paginate(&Locator::from_selector(Selector::text_is(page.to_string())))
            .await
    }

    /// Click the pagination link containing `page`
    pub async fn click_pagination_page_link(&self, page: u32) -> ProbeResult<()> {
        self.paginate(&Locator::from_selector(Selector::css_with_text("a", page.to_string())))
            .await
    }

    /// An element with exactly `expected` as text is visible
    pub async fn verify_entry_info_text(&self, expected: &str) -> ProbeResult<()> {
        self.session
            .expect_visible(&Locator::from_selector(Selector::text_is(expected)))
            .await
    }

    /// The length selector shows `expected`
    pub async fn verify_rows_per_page(&self, expected: &str) -> ProbeResult<()> {
        let select = Locator::new("[name=\"create_tables_length\"]");
        let selected = self.session.input_value(&select).await?;
        tracing::info!(selected = %selected, "rows per page on frontend");
        Assertion::equals("rows per page", &expected, &selected.as_str()).into_result()
    }

    /// The scroll body's computed height in pixels equals `expected`
    pub async fn verify_table_height(&self, expected: &str) -> ProbeResult<()> {
        let wanted = expected
            .trim()
            .parse::<u64>()
            .map_err(|_| ProbeError::config(format!("table height {expected:?} is not a pixel count")))?;
        let rendered = self
            .session
            .computed_style(&Locator::new(".dataTables_scrollBody"), "height")
            .await?;
        let height = parse_leading_int(&rendered, 0);
        tracing::info!(height, "table height on frontend");
        Assertion::equals("table height", &wanted, &height).into_result()
    }

    /// The shortcode placeholder reports a missing table
    pub async fn verify_table_deleted_from_frontend(&self) -> ProbeResult<()> {
        self.session
            .expect_contains_text(
                &Locator::new(".entry-content h5 b"),
                "Table maybe deleted or can't be loaded.",
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::locator::BoundingBox;
    use crate::session::SessionConfig;
    use std::time::Duration;

    fn fast() -> SessionConfig {
        SessionConfig {
            element_timeout: Duration::from_millis(200),
            navigation_timeout: Duration::from_millis(1_000),
            poll_interval: Duration::from_millis(10),
            network_idle: Duration::from_millis(100),
        }
    }

    mod slug_tests {
        use super::*;

        #[test]
        fn test_slugify() {
            assert_eq!(slugify("Flex Table Data"), "flex-table-data");
            assert_eq!(slugify("  Students: 2024 / Draft "), "students-2024-draft");
        }

        #[test]
        fn test_page_url() {
            let session = Session::new(MockDriver::new(), SessionConfig::default());
            let page = FrontendPage::new(&session, "https://wp.test/", "Flex Table Data");
            assert_eq!(page.page_url(), "https://wp.test/flex-table-data/");
        }
    }

    mod layout_tests {
        use super::*;

        fn laid_out() -> MockDriver {
            let mock = MockDriver::new();
            mock.set_one(&FrontendPage::title(), MockElement::text("Students").with_box(BoundingBox::new(0.0, 80.0, 400.0, 30.0)));
            mock.set_one(&FrontendPage::wrapper(), MockElement::default().with_box(BoundingBox::new(0.0, 120.0, 800.0, 600.0)));
            mock.set_one(&FrontendPage::scroll_area(), MockElement::default().with_box(BoundingBox::new(0.0, 160.0, 800.0, 400.0)));
            mock.set_one(
                &Locator::new("#swptls-table-description"),
                MockElement::text("All students").with_box(BoundingBox::new(0.0, 740.0, 800.0, 20.0)),
            );
            mock.set_one(
                &FrontendPage::entry_info(),
                MockElement::text("Showing 1 to 1 of 2 entries").with_box(BoundingBox::new(0.0, 580.0, 300.0, 20.0)),
            );
            mock.set_one(
                &Locator::new("#create_tables_paginate"),
                MockElement::default().with_box(BoundingBox::new(400.0, 580.0, 300.0, 20.0)),
            );
            mock
        }

        #[tokio::test(start_paused = true)]
        async fn test_layout_checks_pass() {
            let session = Session::new(laid_out(), fast());
            let page = FrontendPage::new(&session, "https://wp.test", "Flex Table Data");
            page.verify_table_title_visible().await.unwrap();
            page.verify_table_title_above_table().await.unwrap();
            page.verify_table_description_below_table().await.unwrap();
            page.verify_entry_info_visible().await.unwrap();
            page.verify_pagination_visible().await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_title_below_table_fails() {
            let mock = laid_out();
            mock.set_one(
                &FrontendPage::title(),
                MockElement::text("Students").with_box(BoundingBox::new(0.0, 900.0, 400.0, 30.0)),
            );
            let session = Session::new(mock, fast());
            let page = FrontendPage::new(&session, "https://wp.test", "Flex Table Data");
            let err = page.verify_table_title_above_table().await.unwrap_err();
            assert_eq!(err.kind(), "assertion");
        }
    }

    mod pagination_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_next_waits_for_entry_info_change() {
            let mock = MockDriver::new();
            let next = Locator::from_selector(Selector::css_with_text("span", "Next"));
            mock.set_one(&FrontendPage::entry_info(), MockElement::text("Showing 1 to 1 of 2 entries"));
            mock.set_one(&next, MockElement::text("Next"));
            let key = FrontendPage::entry_info().key();
            let shown = Locator::from_selector(Selector::text_is("Showing 2 to 2 of 2 entries")).key();
            mock.on_click(&next, move |page| {
                if let Some(el) = page.element_mut(&key, 0) {
                    el.text = "Showing 2 to 2 of 2 entries".to_string();
                }
                page.set(shown.clone(), vec![MockElement::text("Showing 2 to 2 of 2 entries")]);
            });
            let session = Session::new(mock.clone(), fast());
            let page = FrontendPage::new(&session, "https://wp.test", "Flex Table Data");
            page.click_pagination_next().await.unwrap();
            page.verify_entry_info_text("Showing 2 to 2 of 2 entries").await.unwrap();
            assert_eq!(
                session.text_content(&FrontendPage::entry_info()).await.unwrap(),
                "Showing 2 to 2 of 2 entries"
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_dead_control_times_out() {
            let mock = MockDriver::new();
            let previous = Locator::from_selector(Selector::css_with_text("span", "Previous"));
            mock.set_one(&FrontendPage::entry_info(), MockElement::text("Showing 1 to 1 of 2 entries"));
            mock.set_one(&previous, MockElement::text("Previous"));
            let session = Session::new(mock, fast());
            let page = FrontendPage::new(&session, "https://wp.test", "Flex Table Data");
            let err = page.click_pagination_previous().await.unwrap_err();
            assert_eq!(err.kind(), "navigation-timeout");
        }
    }

    mod settings_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_rows_and_height() {
            let mock = MockDriver::new();
            mock.set_one(
                &Locator::new("[name=\"create_tables_length\"]"),
                MockElement::select(&[("1", "1"), ("5", "5")]),
            );
            mock.set_one(
                &Locator::new(".dataTables_scrollBody"),
                MockElement::default().with_style("height", "400px"),
            );
            let session = Session::new(mock, fast());
            let page = FrontendPage::new(&session, "https://wp.test", "Flex Table Data");
            page.verify_rows_per_page("1").await.unwrap();
            assert!(page.verify_rows_per_page("5").await.is_err());
            page.verify_table_height("400").await.unwrap();
            assert_eq!(page.verify_table_height("500").await.unwrap_err().kind(), "assertion");
            assert_eq!(page.verify_table_height("tall").await.unwrap_err().kind(), "config");
        }
    }
}
