use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::CHECKPOINT_FILE_NAME;
use crate::constants::DEFAULT_DATA_DIR;
use crate::constants::FLOW_TRACER_MAX_DEPTH;
use crate::constants::FULL_HISTORY_DATA_DIR;
use crate::constants::FULL_HISTORY_MAX_DEPTH;
use crate::constants::GENERAL_DATA_DIR;
use crate::constants::GENERAL_TRACER_MAX_DEPTH;
use crate::error::ConfigError;
use crate::model::QueueOrder;
use crate::model::TableFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracerMode {
    /// Short recursive crawl around the roots.
    #[default]
    General,
    /// Deep recursive crawl feeding the flow analyses.
    Flow,
    /// Complete history of the roots only, every edge of every transaction.
    FullHistory,
}

impl TracerMode {
    pub fn max_depth(&self) -> u32 {
        match self {
            TracerMode::General => GENERAL_TRACER_MAX_DEPTH,
            TracerMode::Flow => FLOW_TRACER_MAX_DEPTH,
            TracerMode::FullHistory => FULL_HISTORY_MAX_DEPTH,
        }
    }

    pub fn table_format(&self) -> TableFormat {
        match self {
            TracerMode::FullHistory => TableFormat::FullHistory,
            _ => TableFormat::Directional,
        }
    }

    /// Each mode keeps its own tables and checkpoint, so a shallow crawl never
    /// marks addresses completed for a deeper one.
    pub fn default_data_dir(&self) -> &'static str {
        match self {
            TracerMode::General => GENERAL_DATA_DIR,
            TracerMode::Flow => DEFAULT_DATA_DIR,
            TracerMode::FullHistory => FULL_HISTORY_DATA_DIR,
        }
    }
}

impl fmt::Display for TracerMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TracerMode::General => write!(f, "general"),
            TracerMode::Flow => write!(f, "flow"),
            TracerMode::FullHistory => write!(f, "full_history"),
        }
    }
}

impl FromStr for TracerMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "general" => Ok(TracerMode::General),
            "flow" => Ok(TracerMode::Flow),
            "full_history" | "fullhistory" => Ok(TracerMode::FullHistory),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub mode: TracerMode,
    // Overrides the mode's depth budget
    pub max_depth: Option<u32>,
    pub queue_order: QueueOrder,
    // Re-crawl completed addresses
    pub force: bool,
    // Read back a table left behind by a crash instead of re-fetching
    pub reuse_existing_tables: bool,
    pub data_dir: Option<String>,
    pub checkpoint_file: Option<String>,
}

impl TracerConfig {
    pub fn effective_max_depth(&self) -> u32 {
        self.max_depth.unwrap_or_else(|| self.mode.max_depth())
    }

    pub fn effective_data_dir(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| self.mode.default_data_dir().to_string())
    }

    pub fn effective_checkpoint_file(&self) -> String {
        self.checkpoint_file.clone().unwrap_or_else(|| CHECKPOINT_FILE_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("general", TracerMode::General, 2)]
    #[case("flow", TracerMode::Flow, 6)]
    #[case("full-history", TracerMode::FullHistory, 0)]
    fn test_mode_parsing_and_depth(
        #[case] raw: &str,
        #[case] mode: TracerMode,
        #[case] depth: u32,
    ) {
        let parsed: TracerMode = raw.parse().unwrap();
        assert_eq!(parsed, mode);
        assert_eq!(parsed.max_depth(), depth);
    }

    #[test]
    fn test_modes_never_share_a_data_dir() {
        let dirs: std::collections::HashSet<String> = [TracerMode::General, TracerMode::Flow, TracerMode::FullHistory]
            .into_iter()
            .map(|mode| {
                TracerConfig {
                    mode,
                    ..Default::default()
                }
                .effective_data_dir()
            })
            .collect();
        assert_eq!(dirs.len(), 3);
        assert_eq!(TracerMode::General.default_data_dir(), "flow_data_general");
        assert_eq!(TracerMode::Flow.default_data_dir(), "flow_data");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!("sideways".parse::<TracerMode>().is_err());
    }

    #[test]
    fn test_depth_override() {
        let config = TracerConfig {
            mode: TracerMode::Flow,
            max_depth: Some(3),
            ..Default::default()
        };
        assert_eq!(config.effective_max_depth(), 3);
        assert_eq!(config.effective_data_dir(), "flow_data");
    }
}
