use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::constants::SHELL_ANALYSIS_MAX_DEPTH;
use crate::constants::SHELL_THRESHOLD;
use crate::constants::SUMMARY_ANALYSIS_MAX_DEPTH;
use crate::constants::SUMMARY_THRESHOLD;
use crate::constants::SWEEP_ANALYSIS_MAX_DEPTH;
use crate::constants::SWEEP_THRESHOLD;
use crate::constants::SWEEP_THRESHOLD_END;
use crate::constants::SWEEP_THRESHOLD_START;
use crate::constants::SWEEP_THRESHOLD_STEPS;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisProfile {
    /// Verified intermediaries and per-exchange totals at one threshold.
    #[default]
    Summary,
    /// Exchange totals across a range of thresholds.
    Sweep,
    /// Verified flow graph with shell layers from the roots.
    Shell,
}

impl AnalysisProfile {
    pub fn max_depth(&self) -> u32 {
        match self {
            AnalysisProfile::Summary => SUMMARY_ANALYSIS_MAX_DEPTH,
            AnalysisProfile::Sweep => SWEEP_ANALYSIS_MAX_DEPTH,
            AnalysisProfile::Shell => SHELL_ANALYSIS_MAX_DEPTH,
        }
    }

    pub fn threshold(&self) -> f64 {
        match self {
            AnalysisProfile::Summary => SUMMARY_THRESHOLD,
            // Headline verified set reported next to the sweep points.
            AnalysisProfile::Sweep => SWEEP_THRESHOLD,
            AnalysisProfile::Shell => SHELL_THRESHOLD,
        }
    }
}

impl fmt::Display for AnalysisProfile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            AnalysisProfile::Summary => write!(f, "summary"),
            AnalysisProfile::Sweep => write!(f, "sweep"),
            AnalysisProfile::Shell => write!(f, "shell"),
        }
    }
}

impl FromStr for AnalysisProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "summary" => Ok(AnalysisProfile::Summary),
            "sweep" => Ok(AnalysisProfile::Sweep),
            "shell" => Ok(AnalysisProfile::Shell),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub profile: AnalysisProfile,
    pub threshold: Option<f64>,
    pub max_depth: Option<u32>,
    pub sweep_start: f64,
    pub sweep_end: f64,
    pub sweep_steps: usize,
    // Flow tables to analyse; the flow tracer's directory when unset
    pub data_dir: Option<String>,
    pub output_dir: String,
    // Full-history tables and wallets for the balance ledger
    pub balance_data_dir: Option<String>,
    pub balance_wallets: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            profile: AnalysisProfile::default(),
            threshold: None,
            max_depth: None,
            sweep_start: SWEEP_THRESHOLD_START,
            sweep_end: SWEEP_THRESHOLD_END,
            sweep_steps: SWEEP_THRESHOLD_STEPS,
            data_dir: None,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            balance_data_dir: None,
            balance_wallets: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or_else(|| self.profile.threshold())
    }

    pub fn effective_max_depth(&self) -> u32 {
        self.max_depth.unwrap_or_else(|| self.profile.max_depth())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("summary", 4, 0.85)]
    #[case("sweep", 4, 0.85)]
    #[case("shell", 6, 0.95)]
    fn test_profile_defaults(
        #[case] raw: &str,
        #[case] depth: u32,
        #[case] threshold: f64,
    ) {
        let profile: AnalysisProfile = raw.parse().unwrap();
        assert_eq!(profile.max_depth(), depth);
        assert_eq!(profile.threshold(), threshold);
    }

    #[test]
    fn test_overrides_win_over_profile() {
        let config = AnalysisConfig {
            profile: AnalysisProfile::Summary,
            threshold: Some(0.5),
            max_depth: Some(1),
            ..Default::default()
        };
        assert_eq!(config.effective_threshold(), 0.5);
        assert_eq!(config.effective_max_depth(), 1);
    }
}
