//! Block extraction pipeline.
//!
//! Segments free-form text into candidate blocks, classifies each one
//! against tree-sitter grammars, structured-data parsers, and regex
//! pattern banks, then runs a precision filter to cut false positives.
//!
//! ## Quick start
//!
//! ```
//! use blockextract::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let report = pipeline
//!     .extract("```python\ndef add(a, b):\n    return a + b\n\nprint(add(1, 2))\n```", None)
//!     .unwrap();
//! assert_eq!(report.accepted.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod registry;
pub mod segmenter;
pub mod types;
pub mod validator;

pub use config::PipelineConfig;
pub use config::SegmenterConfig;
pub use error::PipelineError;
pub use error::Result;
pub use pipeline::Pipeline;
pub use registry::GrammarRegistry;
pub use segmenter::Segmenter;
pub use types::AcceptedBlock;
pub use types::BlockType;
pub use types::CandidateBlock;
pub use types::DetectionMethod;
pub use types::FilterReport;
pub use types::Language;
pub use types::RejectedBlock;
pub use types::RejectionRule;
pub use types::ValidatedBlock;
pub use types::ValidationMethod;
pub use validator::Validator;
