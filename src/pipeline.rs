//! The facade callers actually construct: owns the grammar registry and
//! wires segmenter → validator → filter into one call per document.

use std::sync::Arc;

use tracing::debug;
use tracing::instrument;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::error::Result;
use crate::filter;
use crate::registry::GrammarRegistry;
use crate::segmenter::Segmenter;
use crate::types::FilterReport;
use crate::validator::Validator;

/// Built once per process (grammar compilation isn't free) and reused
/// across documents; cheap to clone since the registry is `Arc`-shared.
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<GrammarRegistry>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Build a pipeline with caller-supplied configuration.
    ///
    /// Does not validate `config` itself — callers that load configuration
    /// from an external source should call [`PipelineConfig::validate`]
    /// first and propagate its error.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            registry: Arc::new(GrammarRegistry::new()),
            config,
        }
    }

    /// Extract and classify blocks from `text`.
    ///
    /// `filename`, if given, supplies an extension hint for the validator's
    /// second cascade step.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn extract(&self, text: &str, filename: Option<&str>) -> Result<FilterReport> {
        let normalized = normalize_line_endings(text);

        let segmenter = Segmenter::from_config(&self.config.segmenter);
        let candidates = segmenter.segment(&normalized);
        debug!(candidates = candidates.len(), "segmented document");

        let validator = Validator::new(&self.registry);
        let validated: Vec<_> = candidates
            .iter()
            .map(|candidate| validator.validate_block(candidate, filename))
            .collect();

        let report = filter::batch_filter(validated);
        debug!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            "filtered document"
        );

        Ok(report)
    }

    /// Convenience wrapper for callers holding raw bytes rather than an
    /// already-decoded `&str`.
    ///
    /// Fails fast with [`PipelineError::InvalidUtf8`] rather than lossily
    /// replacing invalid sequences — this crate never guesses at intent.
    pub fn extract_bytes(&self, bytes: &[u8], filename: Option<&str>) -> Result<FilterReport> {
        let text = std::str::from_utf8(bytes).map_err(|e| PipelineError::InvalidUtf8 {
            cause: e.to_string(),
        })?;
        self.extract(text, filename)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize `\r\n` and bare `\r` to `\n`.
///
/// The only normalization this crate performs itself; everything else
/// (encoding detection, whitespace cleanup) is the caller's job.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;

    #[test]
    fn extracts_fenced_python_block() {
        let pipeline = Pipeline::new();
        let text = "Here's a helper:\n\n```python\ndef add(a, b):\n    return a + b\n\nprint(add(1, 2))\n```\n\nThat's it.";
        let report = pipeline.extract(text, None).unwrap();
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].block.block_type, BlockType::Code);
    }

    #[test]
    fn crlf_input_is_normalized_before_segmentation() {
        let pipeline = Pipeline::new();
        let text = "intro\r\n```python\r\ndef add(a, b):\r\n    return a + b\r\n\r\nprint(add(1, 2))\r\n```\r\n";
        let report = pipeline.extract(text, None).unwrap();
        assert_eq!(report.accepted.len(), 1);
    }

    #[test]
    fn invalid_utf8_bytes_are_rejected_up_front() {
        let pipeline = Pipeline::new();
        let bytes = [0xff, 0xfe, 0x00];
        let result = pipeline.extract_bytes(&bytes, None);
        assert!(matches!(result, Err(PipelineError::InvalidUtf8 { .. })));
    }

    #[test]
    fn plain_prose_document_yields_no_accepted_blocks() {
        let pipeline = Pipeline::new();
        let text = "This is a short document.\nIt has no code in it at all.\nJust a couple of sentences.";
        let report = pipeline.extract(text, None).unwrap();
        assert!(report.accepted.is_empty());
    }
}
