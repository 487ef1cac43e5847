pub mod loader;
pub mod schema;

pub use loader::{CliOverrides, ConfigError, get_default_config_path, load_config};
pub use schema::{AssistantConfig, Config, SearchConfig, ServerConfig, SessionScope};
