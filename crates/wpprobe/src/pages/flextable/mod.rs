//! FlexTable plugin screens: login, plugin management, table builder, page
//! editor and the published frontend.

mod dashboard;
mod editor;
mod frontend;
mod login;
mod plugins;

pub use dashboard::{extract_shortcode, FlexTablePage};
pub use editor::{PageEditorPage, TableRow};
pub use frontend::{slugify, FrontendPage};
pub use login::LoginPage;
pub use plugins::{PluginPage, PluginStatus, PLUGIN_AUTHOR, PLUGIN_TITLE};
