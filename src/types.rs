//! Core data types for the extraction pipeline.
//!
//! Every stage of the pipeline produces an immutable record; later stages
//! build a new, larger record rather than mutating the one before it.

use serde::Deserialize;
use serde::Serialize;

/// The fixed output vocabulary (SPEC_FULL.md §6).
///
/// Closed on purpose: downstream code pattern-matches on this instead of
/// comparing free-form strings, and the registry's supported-grammar set is
/// a subset of it (see [`crate::registry::GrammarRegistry`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Java,
    C,
    Cpp,
    Go,
    Rust,
    #[serde(rename = "c_sharp")]
    CSharp,
    Php,
    Ruby,
    Kotlin,
    Bash,
    Json,
    Yaml,
    Xml,
    #[serde(rename = "cisco_ios")]
    CiscoIos,
    Nginx,
    Log,
    Markdown,
}

impl Language {
    /// Canonical identifier string, matching SPEC_FULL.md §6 exactly.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::CSharp => "c_sharp",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Kotlin => "kotlin",
            Language::Bash => "bash",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Xml => "xml",
            Language::CiscoIos => "cisco_ios",
            Language::Nginx => "nginx",
            Language::Log => "log",
            Language::Markdown => "markdown",
        }
    }

    /// Canonicalize a free-form hint (fence word, user-supplied name) to a
    /// known [`Language`], applying the alias table from SPEC_FULL.md §4.2.
    ///
    /// Unknown input returns `None` rather than guessing.
    pub fn canonicalize_hint(raw: &str) -> Option<Language> {
        let lower = raw.trim().to_lowercase();
        Some(match lower.as_str() {
            "python" | "py" => Language::Python,
            "javascript" | "js" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" | "c++" => Language::Cpp,
            "go" | "golang" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "c_sharp" | "csharp" | "cs" => Language::CSharp,
            "php" => Language::Php,
            "ruby" | "rb" => Language::Ruby,
            "kotlin" | "kt" => Language::Kotlin,
            "bash" | "sh" | "shell" | "zsh" => Language::Bash,
            "json" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            "xml" => Language::Xml,
            "markdown" | "md" => Language::Markdown,
            _ => return None,
        })
    }

    /// Map a filename extension (without the leading dot, any case) to its
    /// canonical language, per the extension table in SPEC_FULL.md §6.
    pub fn from_extension(ext: &str) -> Option<Language> {
        Some(match ext.to_lowercase().as_str() {
            "py" => Language::Python,
            "js" | "jsx" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" | "cc" => Language::Cpp,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "php" => Language::Php,
            "rb" => Language::Ruby,
            "cs" => Language::CSharp,
            "sh" | "bash" | "zsh" => Language::Bash,
            "kt" => Language::Kotlin,
            "json" => Language::Json,
            "xml" => Language::Xml,
            "yaml" | "yml" => Language::Yaml,
            "md" => Language::Markdown,
            _ => return None,
        })
    }

    /// Whether this language is backed by a tree-sitter grammar in the
    /// registry (as opposed to being produced only by the schema/pattern
    /// paths of the validator).
    pub fn is_grammar_backed(self) -> bool {
        !matches!(
            self,
            Language::Json
                | Language::Yaml
                | Language::Xml
                | Language::CiscoIos
                | Language::Nginx
                | Language::Log
                | Language::Markdown
        )
    }
}

/// Broad classification of a block's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Code,
    Structured,
    Config,
    Log,
    Markup,
    Unknown,
}

/// Which segmenter strategy produced a [`CandidateBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Markdown,
    Indentation,
    Density,
}

/// Provenance of a [`ValidatedBlock`]'s classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMethod {
    TreeSitterHint,
    TreeSitterAutoPriority,
    TreeSitterContext,
    TreeSitterAuto,
    Schema,
    Pattern,
    Extension,
}

/// Which precision-filter rule rejected a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionRule {
    ConfidenceThreshold,
    MinimumLines,
    MinimumChars,
    InlineVariable,
    SyntaxIntegrity,
    ProseDetection,
    ContextDensity,
    IndentationCheck,
}

/// A contiguous line range proposed by the segmenter as possibly containing
/// machine-readable content.
///
/// `start_line`/`end_line` are 0-based indices into the document's line
/// array and are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateBlock {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub detection_method: DetectionMethod,
    pub confidence: f64,
    pub language_hint: Option<String>,
}

impl CandidateBlock {
    /// Number of lines spanned by this block.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// A [`CandidateBlock`] enriched with a classification from the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedBlock {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub detection_method: DetectionMethod,
    pub block_type: BlockType,
    pub language: Option<Language>,
    pub confidence_score: f64,
    pub validation_method: Option<ValidationMethod>,
    /// AST node count, populated for `block_type == Code` only.
    pub ast_nodes: Option<usize>,
}

impl ValidatedBlock {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// A [`ValidatedBlock`] that survived every precision-filter rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedBlock {
    #[serde(flatten)]
    pub block: ValidatedBlock,
    pub filter_passed: bool,
}

/// A [`ValidatedBlock`] that a precision-filter rule rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedBlock {
    #[serde(flatten)]
    pub block: ValidatedBlock,
    pub filter_passed: bool,
    pub rejection_reason: String,
    pub filtered_by: RejectionRule,
}

/// Output of [`crate::filter::batch_filter`]: the surviving blocks in
/// `start_line` order, plus a parallel ledger of what was dropped and why.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterReport {
    pub accepted: Vec<AcceptedBlock>,
    pub rejected: Vec<RejectedBlock>,
}
