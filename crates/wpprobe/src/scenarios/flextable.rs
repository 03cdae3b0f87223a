//! FlexTable plugin suite.
//!
//! Logs into WordPress, makes sure the plugin is active, builds a table from
//! a Google Sheet, embeds it in a page through its shortcode, then exercises
//! the display options on the frontend and finally deletes table and page.

use super::FlexTableRun;
use crate::assertion::Assertion;
use crate::pages::flextable::{FlexTablePage, FrontendPage, LoginPage, PageEditorPage, PluginPage, PluginStatus};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::suite::{SerialSuite, StepFuture};
use crate::wait::LoadState;

const PLUGIN_SEARCH: &str = "FlexTable";

/// The nine FlexTable steps
#[must_use]
pub fn suite() -> SerialSuite<FlexTableRun> {
    SerialSuite::new("WPPOOL FlexTable plugin")
        .step("WordPress login", wordpress_login)
        .step("FlexTable plugin activation status", plugin_activation)
        .step("FlexTable dashboard", flextable_dashboard)
        .step("Create table from Google Sheet", create_table)
        .step("Table display using shortcode", embed_table)
        .step("Show table title and description below table", title_and_description)
        .step("Entry info and pagination", entry_info_and_pagination)
        .step("Rows per page and table height", rows_and_height)
        .step("Delete table and page", delete_table_and_page)
}

fn frontend(session: &Session, run: &FlexTableRun) -> ProbeResult<FrontendPage> {
    let base_url = run.config.require_base_url()?;
    let title = run.config.require_page_title()?;
    Ok(FrontendPage::new(session, base_url, title))
}

/// Admin home, then the first table's customization tab
async fn open_table_customization(session: &Session, run: &FlexTableRun) -> ProbeResult<FlexTablePage> {
    let tables = open_all_tables(session, run).await?;
    tables.navigate_to_table_edit_page().await?;
    tables.navigate_to_table_customization().await?;
    Ok(tables)
}

async fn open_all_tables(session: &Session, run: &FlexTableRun) -> ProbeResult<FlexTablePage> {
    session
        .goto_until(run.config.require_wordpress_url()?, LoadState::NetworkIdle)
        .await?;
    let tables = FlexTablePage::new(session);
    tables.navigate_to_all_tables().await?;
    let loaded = tables.verify_all_tables_page_loaded().await?;
    Assertion::is_true(loaded, "FlexTable all-tables page loaded").into_result()?;
    Ok(tables)
}

fn wordpress_login<'a>(session: &'a Session, run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let (username, password) = run.config.require_credentials()?;
        let url = run.config.require_wordpress_url()?;

        let login = LoginPage::new(session);
        login.navigate_to_login(url).await?;
        login.handle_sandbox_continue().await?;
        login.login(username, password).await?;
        login.verify_login_success().await?;
        tracing::info!("WordPress login successful");
        Ok(())
    })
}

fn plugin_activation<'a>(session: &'a Session, _run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let plugins = PluginPage::new(session);
        plugins.navigate_to_plugins().await?;
        plugins.search_plugin(PLUGIN_SEARCH).await?;

        let status = plugins.plugin_status().await?;
        tracing::info!(?status, "plugin status");
        match status {
            PluginStatus::Active => plugins.verify_plugin_activated().await?,
            PluginStatus::Inactive => {
                plugins.activate_plugin_if_inactive().await?;
                plugins.navigate_to_installed_plugins().await?;
                plugins.search_installed_plugin(PLUGIN_SEARCH).await?;
                plugins.verify_plugin_activated().await?;
            }
            PluginStatus::NotInstalled => {
                plugins.navigate_to_add_plugins().await?;
                plugins.search_plugin_in_repository(PLUGIN_SEARCH).await?;
                plugins.verify_plugin_title().await?;
                plugins.verify_author().await?;
                plugins.install_plugin().await?;
                plugins.wait_for_activate_button().await?;
                plugins.activate_plugin().await?;
                plugins.navigate_to_installed_plugins().await?;
                plugins.search_installed_plugin(PLUGIN_SEARCH).await?;
                plugins.verify_plugin_activated().await?;
            }
        }

        plugins.navigate_to_dashboard().await?;
        plugins.verify_dashboard_loaded().await
    })
}

fn flextable_dashboard<'a>(session: &'a Session, _run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let tables = FlexTablePage::new(session);
        tables.navigate_to_dashboard().await?;
        let loaded = tables.verify_dashboard_loaded().await?;
        Assertion::is_true(loaded, "FlexTable dashboard loaded").into_result()
    })
}

fn create_table<'a>(session: &'a Session, run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let sheet_url = run.config.require_google_sheet_url()?;
        let (title, description) = run.config.require_table_details()?;

        let tables = FlexTablePage::new(session);
        tables.click_create_new_table().await?;
        tables.fill_google_sheet_url(sheet_url).await?;
        tables.create_table_from_url().await?;
        tables.fill_table_details(title, description).await?;
        tables.save_changes().await?;
        tables.verify_saved_successfully().await?;
        tables.return_to_dashboard().await?;
        tables.verify_table_title(title).await?;
        tracing::info!(title, "table listed on the dashboard");
        Ok(())
    })
}

fn embed_table<'a>(session: &'a Session, run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let page_title = run.config.require_page_title()?;

        let shortcode = FlexTablePage::new(session).get_shortcode_value().await?;
        tracing::info!(%shortcode, "table shortcode extracted");
        run.state.shortcode = Some(shortcode.clone());

        let editor = PageEditorPage::new(session);
        editor.navigate_to_pages().await?;
        editor.add_new_page().await?;
        editor.fill_page_title(page_title).await?;
        editor.add_flex_table_block().await?;
        editor.select_table(&shortcode).await?;
        editor.publish_page().await?;
        editor.return_to_pages().await?;
        editor.verify_published_page_title(page_title).await?;

        editor.open_published_page(page_title).await?;
        editor.verify_front_page_title(page_title).await?;

        let expected = &run.config.expected_rows;
        let actual = editor.extract_table_data(&shortcode, expected.len()).await?;
        Assertion::equals("table rows match the sheet", expected, &actual).into_result()?;
        tracing::info!(rows = actual.len(), "table data matches the sheet");
        Ok(())
    })
}

fn title_and_description<'a>(session: &'a Session, run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let frontend = frontend(session, run)?;

        let tables = open_table_customization(session, run).await?;
        tables.enable_show_table_title().await?;
        tables.enable_show_table_description().await?;
        tables.set_description_position_below().await?;
        tables.save_changes().await?;
        tables.verify_saved_successfully().await?;

        frontend.navigate_to_table_page().await?;
        frontend.verify_table_title_visible().await?;
        frontend.verify_table_title_above_table().await?;
        frontend.verify_table_description_below_table().await
    })
}

fn entry_info_and_pagination<'a>(session: &'a Session, run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let frontend = frontend(session, run)?;

        let tables = open_table_customization(session, run).await?;
        tables.verify_table_bottom_elements().await?;
        tables.enable_entry_info().await?;
        tables.enable_pagination().await?;
        tables.save_changes().await?;
        tables.verify_saved_successfully().await?;

        frontend.navigate_to_table_page().await?;
        frontend.verify_entry_info_visible().await?;
        frontend.verify_pagination_visible().await?;
        frontend
            .verify_entry_info_text(&run.config.expected_entry_info)
            .await?;

        frontend.click_pagination_next().await?;
        frontend.click_pagination_previous().await?;
        frontend.click_pagination_page(2).await?;
        frontend.click_pagination_page_link(1).await?;
        tracing::info!("pagination controls functional");
        Ok(())
    })
}

fn rows_and_height<'a>(session: &'a Session, run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let (rows_per_page, height) = run.config.require_styling()?;
        let frontend = frontend(session, run)?;

        let tables = open_table_customization(session, run).await?;
        tables.navigate_to_styling_tab().await?;
        tables.set_rows_per_page(rows_per_page).await?;
        tables.set_table_height(height).await?;
        tables.save_changes().await?;
        tables.verify_saved_successfully().await?;

        frontend.navigate_to_table_page().await?;
        session.wait_for_load_state(LoadState::NetworkIdle).await?;
        frontend.verify_rows_per_page(rows_per_page).await?;
        frontend.verify_table_height(height).await
    })
}

fn delete_table_and_page<'a>(session: &'a Session, run: &'a mut FlexTableRun) -> StepFuture<'a> {
    Box::pin(async move {
        let page_title = run.config.require_page_title()?;
        let frontend = frontend(session, run)?;

        let tables = open_all_tables(session, run).await?;
        tables.delete_table().await?;
        tables.confirm_delete().await?;
        tables.verify_table_deleted_from_backend().await?;
        tracing::info!("table deleted from the backend");

        frontend.navigate_to_table_page().await?;
        session.wait_for_load_state(LoadState::NetworkIdle).await?;
        frontend.verify_table_deleted_from_frontend().await?;

        session.goto(run.config.require_wordpress_url()?).await?;
        let editor = PageEditorPage::new(session);
        editor.navigate_to_pages().await?;
        editor.delete_page().await?;
        editor.go_to_trash().await?;
        editor.permanently_delete_page(page_title).await?;
        editor.verify_page_deleted_from_trash().await?;
        run.state.shortcode = None;
        tracing::info!(page = page_title, "page permanently deleted");
        Ok(())
    })
}
