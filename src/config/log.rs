use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    // Directory where logs will be stored
    pub directory: Option<String>,
    // Terminal filter when RUST_LOG is unset
    pub terminal_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: Some(".logs".to_string()),
            terminal_level: "info".to_string(),
        }
    }
}
