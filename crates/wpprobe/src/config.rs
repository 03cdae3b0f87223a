//! Suite configuration.
//!
//! Values come from three layers, later ones overriding earlier ones:
//! built-in defaults, an optional YAML file, then the process environment
//! under the variable names the suites have always used
//! (`WORDPRESS_USERNAME`, `WOOCOMMERCE_BASE_URL`, ...). An empty variable
//! counts as unset.

use crate::driver::BrowserConfig;
use crate::pages::flextable::TableRow;
use crate::pages::woocommerce::BillingDetails;
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Browser launch settings as they appear in the config file
pub type BrowserSettings = BrowserConfig;

/// Value of a required setting, or a precondition error naming it
pub fn require<'a>(value: &'a Option<String>, name: &str) -> ProbeResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ProbeError::precondition(format!("{name} is not set"))),
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn apply<F>(fields: Vec<(&'static str, &mut Option<String>)>, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    for (name, slot) in fields {
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            tracing::debug!(variable = name, "setting taken from environment");
            *slot = Some(value);
        }
    }
}

// =============================================================================
// FLEXTABLE
// =============================================================================

/// Settings of the FlexTable suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlexTableConfig {
    /// Site root the published page lives under (`BASE_URL`)
    pub base_url: Option<String>,
    /// Admin login URL (`WORDPRESS_URL`)
    pub wordpress_url: Option<String>,
    /// `WORDPRESS_USERNAME`
    pub username: Option<String>,
    /// `WORDPRESS_PASSWORD`
    pub password: Option<String>,
    /// Source spreadsheet (`GOOGLE_SHEET_URL`)
    pub google_sheet_url: Option<String>,
    /// `TABLE_TITLE`
    pub table_title: Option<String>,
    /// `TABLE_DESCRIPTION`
    pub table_description: Option<String>,
    /// Title of the page embedding the table (`PAGE_TITLE`)
    pub page_title: Option<String>,
    /// Rows-per-page option value (`ROWS_PER_PAGE`)
    pub rows_per_page: Option<String>,
    /// Table height in pixels (`TABLE_HEIGHT`)
    pub table_height: Option<String>,
    /// First rows of the spreadsheet, as rendered
    pub expected_rows: Vec<TableRow>,
    /// Entry info shown on the first page once pagination is on
    pub expected_entry_info: String,
}

impl Default for FlexTableConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            wordpress_url: None,
            username: None,
            password: None,
            google_sheet_url: None,
            table_title: None,
            table_description: None,
            page_title: None,
            rows_per_page: None,
            table_height: None,
            expected_rows: vec![
                TableRow::new("Tahsin", "10", "CSE"),
                TableRow::new("Arafat", "11", "EEE"),
            ],
            expected_entry_info: "Showing 1 to 10 of 15 entries".to_string(),
        }
    }
}

impl FlexTableConfig {
    fn fields(&self) -> Vec<(&'static str, &Option<String>)> {
        vec![
            ("BASE_URL", &self.base_url),
            ("WORDPRESS_URL", &self.wordpress_url),
            ("WORDPRESS_USERNAME", &self.username),
            ("WORDPRESS_PASSWORD", &self.password),
            ("GOOGLE_SHEET_URL", &self.google_sheet_url),
            ("TABLE_TITLE", &self.table_title),
            ("TABLE_DESCRIPTION", &self.table_description),
            ("PAGE_TITLE", &self.page_title),
            ("ROWS_PER_PAGE", &self.rows_per_page),
            ("TABLE_HEIGHT", &self.table_height),
        ]
    }

    fn fields_mut(&mut self) -> Vec<(&'static str, &mut Option<String>)> {
        vec![
            ("BASE_URL", &mut self.base_url),
            ("WORDPRESS_URL", &mut self.wordpress_url),
            ("WORDPRESS_USERNAME", &mut self.username),
            ("WORDPRESS_PASSWORD", &mut self.password),
            ("GOOGLE_SHEET_URL", &mut self.google_sheet_url),
            ("TABLE_TITLE", &mut self.table_title),
            ("TABLE_DESCRIPTION", &mut self.table_description),
            ("PAGE_TITLE", &mut self.page_title),
            ("ROWS_PER_PAGE", &mut self.rows_per_page),
            ("TABLE_HEIGHT", &mut self.table_height),
        ]
    }

    /// Names of the unset variables
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, v)| !is_set(v))
            .map(|(name, _)| name)
            .collect()
    }

    /// Admin credentials
    pub fn require_credentials(&self) -> ProbeResult<(&str, &str)> {
        Ok((
            require(&self.username, "WORDPRESS_USERNAME")?,
            require(&self.password, "WORDPRESS_PASSWORD")?,
        ))
    }

    /// Admin login URL
    pub fn require_wordpress_url(&self) -> ProbeResult<&str> {
        require(&self.wordpress_url, "WORDPRESS_URL")
    }

    /// Site root
    pub fn require_base_url(&self) -> ProbeResult<&str> {
        require(&self.base_url, "BASE_URL")
    }

    /// Source spreadsheet
    pub fn require_google_sheet_url(&self) -> ProbeResult<&str> {
        require(&self.google_sheet_url, "GOOGLE_SHEET_URL")
    }

    /// Table title and description
    pub fn require_table_details(&self) -> ProbeResult<(&str, &str)> {
        Ok((
            require(&self.table_title, "TABLE_TITLE")?,
            require(&self.table_description, "TABLE_DESCRIPTION")?,
        ))
    }

    /// Page title
    pub fn require_page_title(&self) -> ProbeResult<&str> {
        require(&self.page_title, "PAGE_TITLE")
    }

    /// Rows per page and table height
    pub fn require_styling(&self) -> ProbeResult<(&str, &str)> {
        Ok((
            require(&self.rows_per_page, "ROWS_PER_PAGE")?,
            require(&self.table_height, "TABLE_HEIGHT")?,
        ))
    }
}

// =============================================================================
// WOOCOMMERCE
// =============================================================================

/// Settings of the WooCommerce suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WooCommerceConfig {
    /// Storefront root (`WOOCOMMERCE_BASE_URL`)
    pub base_url: Option<String>,
    /// Admin login URL (`WOOCOMMERCE_ADMIN_URL`)
    pub admin_url: Option<String>,
    /// `WOOCOMMERCE_ADMIN_USERNAME`
    pub admin_username: Option<String>,
    /// `WOOCOMMERCE_ADMIN_PASSWORD`
    pub admin_password: Option<String>,
    /// Display name of the customer (`WOOCOMMERCE_CUSTOMER_NAME`)
    pub customer_name: Option<String>,
    /// `WOOCOMMERCE_CUSTOMER_USERNAME`
    pub customer_username: Option<String>,
    /// `WOOCOMMERCE_CUSTOMER_PASSWORD`
    pub customer_password: Option<String>,
    /// Values the checkout form is normalized to
    pub billing: BillingDetails,
    /// Text typed into the order notes
    pub order_notes: String,
}

impl Default for WooCommerceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            admin_url: None,
            admin_username: None,
            admin_password: None,
            customer_name: None,
            customer_username: None,
            customer_password: None,
            billing: BillingDetails::default(),
            order_notes: "Please deliver between 9 AM to 5 PM. Leave the package at the front door if no one is home."
                .to_string(),
        }
    }
}

impl WooCommerceConfig {
    fn fields(&self) -> Vec<(&'static str, &Option<String>)> {
        vec![
            ("WOOCOMMERCE_BASE_URL", &self.base_url),
            ("WOOCOMMERCE_ADMIN_URL", &self.admin_url),
            ("WOOCOMMERCE_ADMIN_USERNAME", &self.admin_username),
            ("WOOCOMMERCE_ADMIN_PASSWORD", &self.admin_password),
            ("WOOCOMMERCE_CUSTOMER_NAME", &self.customer_name),
            ("WOOCOMMERCE_CUSTOMER_USERNAME", &self.customer_username),
            ("WOOCOMMERCE_CUSTOMER_PASSWORD", &self.customer_password),
        ]
    }

    fn fields_mut(&mut self) -> Vec<(&'static str, &mut Option<String>)> {
        vec![
            ("WOOCOMMERCE_BASE_URL", &mut self.base_url),
            ("WOOCOMMERCE_ADMIN_URL", &mut self.admin_url),
            ("WOOCOMMERCE_ADMIN_USERNAME", &mut self.admin_username),
            ("WOOCOMMERCE_ADMIN_PASSWORD", &mut self.admin_password),
            ("WOOCOMMERCE_CUSTOMER_NAME", &mut self.customer_name),
            ("WOOCOMMERCE_CUSTOMER_USERNAME", &mut self.customer_username),
            ("WOOCOMMERCE_CUSTOMER_PASSWORD", &mut self.customer_password),
        ]
    }

    /// Names of the unset variables
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, v)| !is_set(v))
            .map(|(name, _)| name)
            .collect()
    }

    /// Storefront root
    pub fn require_base_url(&self) -> ProbeResult<&str> {
        require(&self.base_url, "WOOCOMMERCE_BASE_URL")
    }

    /// Admin login URL
    pub fn require_admin_url(&self) -> ProbeResult<&str> {
        require(&self.admin_url, "WOOCOMMERCE_ADMIN_URL")
    }

    /// Customer credentials
    pub fn require_customer_credentials(&self) -> ProbeResult<(&str, &str)> {
        Ok((
            require(&self.customer_username, "WOOCOMMERCE_CUSTOMER_USERNAME")?,
            require(&self.customer_password, "WOOCOMMERCE_CUSTOMER_PASSWORD")?,
        ))
    }

    /// Admin credentials
    pub fn require_admin_credentials(&self) -> ProbeResult<(&str, &str)> {
        Ok((
            require(&self.admin_username, "WOOCOMMERCE_ADMIN_USERNAME")?,
            require(&self.admin_password, "WOOCOMMERCE_ADMIN_PASSWORD")?,
        ))
    }

    /// Customer display name
    pub fn require_customer_name(&self) -> ProbeResult<&str> {
        require(&self.customer_name, "WOOCOMMERCE_CUSTOMER_NAME")
    }
}

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Wait budgets in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Element waits
    pub element_ms: u64,
    /// Load-state and URL waits
    pub navigation_ms: u64,
    /// Poll interval
    pub poll_interval_ms: u64,
    /// Network quiescence window
    pub network_idle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            element_ms: session.element_timeout.as_millis() as u64,
            navigation_ms: session.navigation_timeout.as_millis() as u64,
            poll_interval_ms: session.poll_interval.as_millis() as u64,
            network_idle_ms: session.network_idle.as_millis() as u64,
        }
    }
}

impl From<Timeouts> for SessionConfig {
    fn from(t: Timeouts) -> Self {
        Self {
            element_timeout: Duration::from_millis(t.element_ms),
            navigation_timeout: Duration::from_millis(t.navigation_ms),
            poll_interval: Duration::from_millis(t.poll_interval_ms.max(1)),
            network_idle: Duration::from_millis(t.network_idle_ms),
        }
    }
}

// =============================================================================
// SUITE CONFIG
// =============================================================================

/// Complete configuration of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// FlexTable suite
    pub flextable: FlexTableConfig,
    /// WooCommerce suite
    pub woocommerce: WooCommerceConfig,
    /// Browser launch
    pub browser: BrowserSettings,
    /// Wait budgets
    pub timeouts: Timeouts,
}

impl SuiteConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> ProbeResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ProbeError::config(format!("cannot read {}: {e}", path.display()))
                })?;
                tracing::info!(path = %path.display(), "configuration file loaded");
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };
        config.apply_env_from(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override values from a variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        apply(self.flextable.fields_mut(), &lookup);
        apply(self.woocommerce.fields_mut(), &lookup);
        if let Some(headless) = lookup("WPPROBE_HEADLESS") {
            self.browser.headless = !matches!(headless.trim(), "0" | "false" | "no");
        }
        if let Some(path) = lookup("WPPROBE_CHROMIUM_PATH").filter(|p| !p.is_empty()) {
            self.browser.chromium_path = Some(path);
        }
    }

    /// Session timing derived from [`Timeouts`]
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        self.timeouts.into()
    }
}
