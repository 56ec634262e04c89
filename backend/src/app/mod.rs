//! Application assembly shared by the HTTP server and the `import-zone` tool.

mod components;
mod settings;

pub use components::{AppComponents, ComponentError, ExternalServices, Repositories};
pub use settings::{ServerSettings, SettingsError};
