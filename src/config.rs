//! Configuration for the extraction pipeline.
//!
//! Only the segmenter's own tunables are configurable — everything else
//! SPEC_FULL.md pins as an invariant (the 0.50 confidence gate, the 3-line
//! minimum used by the filter, the pattern-bank thresholds) is a `const`
//! inside the module that owns it, not a config field.

use serde::Deserialize;
use serde::Serialize;

use crate::error::PipelineError;
use crate::error::Result;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Segmenter configuration.
    #[serde(default)]
    pub segmenter: SegmenterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate configuration values.
    ///
    /// Ensures numeric values stay inside ranges the segmenter's line-index
    /// arithmetic assumes, rather than letting a bad config panic deep
    /// inside [`crate::segmenter::Segmenter::segment`].
    pub fn validate(&self) -> Result<()> {
        self.segmenter.validate()
    }
}

/// Segmenter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmenterConfig {
    /// Minimum lines a candidate block must span to be kept.
    #[serde(default = "default_min_block_lines")]
    pub min_block_lines: usize,

    /// Sliding-window size used by the density strategy.
    #[serde(default = "default_density_window")]
    pub density_window: usize,

    /// Technical-character density a window must exceed to seed a
    /// density-based candidate.
    #[serde(default = "default_density_threshold")]
    pub density_threshold: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_block_lines: default_min_block_lines(),
            density_window: default_density_window(),
            density_threshold: default_density_threshold(),
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_block_lines == 0 {
            return Err(PipelineError::ConfigError {
                field: "segmenter.min_block_lines".to_string(),
                cause: "must be positive".to_string(),
            });
        }
        if self.density_window == 0 {
            return Err(PipelineError::ConfigError {
                field: "segmenter.density_window".to_string(),
                cause: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.density_threshold) {
            return Err(PipelineError::ConfigError {
                field: "segmenter.density_threshold".to_string(),
                cause: format!("must be in [0.0, 1.0], got {}", self.density_threshold),
            });
        }
        Ok(())
    }
}

fn default_min_block_lines() -> usize {
    3
}
fn default_density_window() -> usize {
    5
}
fn default_density_threshold() -> f64 {
    0.15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_min_block_lines_is_rejected() {
        let config = PipelineConfig {
            segmenter: SegmenterConfig {
                min_block_lines: 0,
                ..SegmenterConfig::default()
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_density_threshold_is_rejected() {
        let config = PipelineConfig {
            segmenter: SegmenterConfig {
                density_threshold: 1.5,
                ..SegmenterConfig::default()
            },
        };
        assert!(config.validate().is_err());
    }
}
