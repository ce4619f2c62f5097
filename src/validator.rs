//! Classifies a [`CandidateBlock`] into a [`ValidatedBlock`] by cascading
//! through language-hint, extension-hint, auto-detect, structured-data,
//! config-pattern, and log-pattern checks, stopping at the first match.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::registry::GrammarRegistry;
use crate::types::{BlockType, CandidateBlock, Language, ValidatedBlock, ValidationMethod};

static CISCO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)access-list\s+\d+\s+(permit|deny)",
        r"(?i)vlan\s+\d+",
        r"(?i)interface\s+\w+",
        r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
        r"(?i)router\s+(bgp|ospf|eigrp)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static NGINX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"server\s*\{",
        r"location\s+[~*^]*\s*[\w/]+\s*\{",
        r"listen\s+\d+",
        r"proxy_pass\s+https?://",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static LOG_TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}[T\s]\d{2}:\d{2}:\d{2}").unwrap());
static LOG_SEVERITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(DEBUG|INFO|WARN|WARNING|ERROR|ERR|CRITICAL|FATAL)\b").unwrap());

/// Languages tried, in order, during auto-detection. Deliberately narrower
/// than the registry's full grammar set: broadening this list widens the
/// window for a wrong-but-plausible guess to beat the real extension hint.
const AUTO_DETECT_ORDER: &[Language] = &[
    Language::Python,
    Language::JavaScript,
    Language::Java,
    Language::Go,
    Language::Bash,
    Language::Php,
    Language::Ruby,
];

/// Auto-detect confidence above which step 2 preempts the extension hint
/// entirely — content that parses this cleanly overrides a misleading
/// filename.
const AUTO_DETECT_PRIORITY_THRESHOLD: f64 = 0.75;

struct LangOutcome {
    language: Language,
    confidence: f64,
    ast_nodes: usize,
}

/// Stateless classifier; holds no data of its own beyond the registry it
/// borrows, so one instance can be shared across documents.
pub struct Validator<'a> {
    registry: &'a GrammarRegistry,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a GrammarRegistry) -> Self {
        Self { registry }
    }

    /// Classify one candidate, optionally using `filename` to derive an
    /// extension hint (SPEC_FULL.md §4.3 step 3).
    pub fn validate_block(&self, block: &CandidateBlock, filename: Option<&str>) -> ValidatedBlock {
        let extension_hint = filename.and_then(|f| {
            f.rsplit('.')
                .next()
                .filter(|_| f.contains('.'))
                .and_then(Language::from_extension)
        });

        // 1. Explicit language hint from the fence — highest priority.
        if let Some(hint) = &block.language_hint {
            if let Some(language) = Language::canonicalize_hint(hint) {
                if let Some(outcome) = self.validate_programming_language(&block.content, language) {
                    return ValidatedBlock {
                        content: block.content.clone(),
                        start_line: block.start_line,
                        end_line: block.end_line,
                        detection_method: block.detection_method,
                        block_type: BlockType::Code,
                        language: Some(outcome.language),
                        confidence_score: outcome.confidence,
                        validation_method: Some(ValidationMethod::TreeSitterHint),
                        ast_nodes: Some(outcome.ast_nodes),
                    };
                }
            }
        }

        // 2. High-confidence auto-detect preempts the extension hint: content
        // that parses cleanly under a grammar outranks a possibly-misleading
        // filename (e.g. HTML saved as `.txt`).
        let auto_detect = self.detect_programming_language(&block.content);
        if let Some(outcome) = &auto_detect {
            if outcome.confidence > AUTO_DETECT_PRIORITY_THRESHOLD {
                return ValidatedBlock {
                    content: block.content.clone(),
                    start_line: block.start_line,
                    end_line: block.end_line,
                    detection_method: block.detection_method,
                    block_type: BlockType::Code,
                    language: Some(outcome.language),
                    confidence_score: outcome.confidence,
                    validation_method: Some(ValidationMethod::TreeSitterAutoPriority),
                    ast_nodes: Some(outcome.ast_nodes),
                };
            }
        }

        // 3. File-extension hint.
        if let Some(ext_lang) = extension_hint {
            if ext_lang == Language::Markdown {
                return ValidatedBlock {
                    content: block.content.clone(),
                    start_line: block.start_line,
                    end_line: block.end_line,
                    detection_method: block.detection_method,
                    block_type: BlockType::Markup,
                    language: Some(Language::Markdown),
                    confidence_score: 0.90,
                    validation_method: Some(ValidationMethod::Extension),
                    ast_nodes: None,
                };
            } else if matches!(ext_lang, Language::Json | Language::Xml | Language::Yaml) {
                if let Some((lang, conf)) = validate_structured_data(&block.content) {
                    if lang == ext_lang {
                        return ValidatedBlock {
                            content: block.content.clone(),
                            start_line: block.start_line,
                            end_line: block.end_line,
                            detection_method: block.detection_method,
                            block_type: BlockType::Structured,
                            language: Some(lang),
                            confidence_score: (conf + 0.1).min(0.99),
                            validation_method: Some(ValidationMethod::Schema),
                            ast_nodes: None,
                        };
                    }
                }
            } else if let Some(outcome) = self.validate_programming_language(&block.content, ext_lang) {
                return ValidatedBlock {
                    content: block.content.clone(),
                    start_line: block.start_line,
                    end_line: block.end_line,
                    detection_method: block.detection_method,
                    block_type: BlockType::Code,
                    language: Some(outcome.language),
                    confidence_score: (outcome.confidence + 0.15).min(0.99),
                    validation_method: Some(ValidationMethod::TreeSitterContext),
                    ast_nodes: Some(outcome.ast_nodes),
                };
            }
        }

        // 4. Automatic detection fallback, at whatever confidence step 2 found.
        if let Some(outcome) = auto_detect {
            return ValidatedBlock {
                content: block.content.clone(),
                start_line: block.start_line,
                end_line: block.end_line,
                detection_method: block.detection_method,
                block_type: BlockType::Code,
                language: Some(outcome.language),
                confidence_score: outcome.confidence,
                validation_method: Some(ValidationMethod::TreeSitterAuto),
                ast_nodes: Some(outcome.ast_nodes),
            };
        }

        // 5. Generic structured-data validation.
        if let Some((lang, conf)) = validate_structured_data(&block.content) {
            return ValidatedBlock {
                content: block.content.clone(),
                start_line: block.start_line,
                end_line: block.end_line,
                detection_method: block.detection_method,
                block_type: BlockType::Structured,
                language: Some(lang),
                confidence_score: conf,
                validation_method: Some(ValidationMethod::Schema),
                ast_nodes: None,
            };
        }

        // 6. Network/server config pattern banks.
        if let Some((lang, conf)) = validate_config(&block.content) {
            return ValidatedBlock {
                content: block.content.clone(),
                start_line: block.start_line,
                end_line: block.end_line,
                detection_method: block.detection_method,
                block_type: BlockType::Config,
                language: Some(lang),
                confidence_score: conf,
                validation_method: Some(ValidationMethod::Pattern),
                ast_nodes: None,
            };
        }

        // 7. Log pattern bank.
        if let Some(conf) = validate_log(&block.content) {
            return ValidatedBlock {
                content: block.content.clone(),
                start_line: block.start_line,
                end_line: block.end_line,
                detection_method: block.detection_method,
                block_type: BlockType::Log,
                language: Some(Language::Log),
                confidence_score: conf,
                validation_method: Some(ValidationMethod::Pattern),
                ast_nodes: None,
            };
        }

        // Nothing matched.
        ValidatedBlock {
            content: block.content.clone(),
            start_line: block.start_line,
            end_line: block.end_line,
            detection_method: block.detection_method,
            block_type: BlockType::Unknown,
            language: None,
            confidence_score: block.confidence * 0.5,
            validation_method: None,
            ast_nodes: None,
        }
    }

    fn validate_programming_language(&self, code: &str, language: Language) -> Option<LangOutcome> {
        let outcome = self.registry.validate(code, language)?;

        let size_bonus = (outcome.node_count as f64 / 500.0).min(0.09);
        let mut confidence = (0.90 + size_bonus).min(0.99);

        if !self.registry.balanced_brackets(code) {
            confidence = (confidence - 0.15).max(0.0);
        }

        Some(LangOutcome {
            language,
            confidence,
            ast_nodes: outcome.node_count,
        })
    }

    fn detect_programming_language(&self, code: &str) -> Option<LangOutcome> {
        let mut best: Option<LangOutcome> = None;

        for &lang in AUTO_DETECT_ORDER {
            let mut outcome = self.validate_programming_language(code, lang);

            if lang == Language::Bash && code.starts_with("#!") {
                outcome = Some(LangOutcome {
                    language: Language::Bash,
                    confidence: 1.0,
                    ast_nodes: outcome.map(|o| o.ast_nodes).unwrap_or(0),
                });
            }

            if let Some(candidate) = outcome {
                if best.as_ref().map(|b| candidate.confidence > b.confidence).unwrap_or(true) {
                    best = Some(candidate);
                }
            }
        }

        best
    }
}

fn validate_structured_data(content: &str) -> Option<(Language, f64)> {
    if serde_json::from_str::<serde_json::Value>(content).is_ok() {
        return Some((Language::Json, 0.98));
    }

    // serde_yaml::Value happily parses almost any scalar string, so a bare
    // prose sentence "validates" as YAML. The colon+newline guard is the
    // only thing standing between this branch and classifying everything
    // as YAML (see DESIGN.md's Open Question on this).
    if content.contains(':')
        && content.contains('\n')
        && serde_yaml::from_str::<serde_yaml::Value>(content).is_ok()
    {
        return Some((Language::Yaml, 0.95));
    }

    if is_well_formed_xml(content) {
        return Some((Language::Xml, 0.96));
    }

    None
}

fn is_well_formed_xml(content: &str) -> bool {
    let mut reader = quick_xml::Reader::from_str(content);
    let mut buf = Vec::new();
    let mut saw_element = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Eof) => break,
            Ok(quick_xml::events::Event::Start(_)) | Ok(quick_xml::events::Event::Empty(_)) => {
                saw_element = true;
            }
            Ok(_) => {}
            Err(_) => return false,
        }
        buf.clear();
    }

    saw_element
}

fn validate_config(content: &str) -> Option<(Language, f64)> {
    let cisco_matches = CISCO_PATTERNS.iter().filter(|re| re.is_match(content)).count();
    if cisco_matches >= 2 {
        return Some((Language::CiscoIos, 0.85));
    }

    let nginx_matches = NGINX_PATTERNS.iter().filter(|re| re.is_match(content)).count();
    if nginx_matches >= 2 {
        return Some((Language::Nginx, 0.85));
    }

    None
}

fn validate_log(content: &str) -> Option<f64> {
    let timestamp_count = LOG_TIMESTAMP_RE.find_iter(content).count();
    let severity_count = LOG_SEVERITY_RE.find_iter(content).count();

    if timestamp_count == 0 || severity_count == 0 {
        return None;
    }

    Some(0.80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionMethod;

    fn candidate(content: &str, hint: Option<&str>) -> CandidateBlock {
        CandidateBlock {
            content: content.to_string(),
            start_line: 0,
            end_line: content.matches('\n').count(),
            detection_method: DetectionMethod::Markdown,
            confidence: 0.9,
            language_hint: hint.map(|s| s.to_string()),
        }
    }

    #[test]
    fn valid_json_is_structured() {
        let registry = GrammarRegistry::new();
        let validator = Validator::new(&registry);
        let block = candidate(r#"{"a": 1, "b": [1, 2, 3]}"#, None);
        let result = validator.validate_block(&block, None);
        assert_eq!(result.block_type, BlockType::Structured);
        assert_eq!(result.language, Some(Language::Json));
    }

    #[test]
    fn cisco_config_needs_two_patterns() {
        let registry = GrammarRegistry::new();
        let validator = Validator::new(&registry);
        // Exactly 2 matched patterns (interface, vlan) — the fixed-constant
        // contract requires 0.85 here, not a formula that only reaches 0.85
        // once enough patterns stack up.
        let block = candidate("interface GigabitEthernet0/1\nvlan 10\n", None);
        let result = validator.validate_block(&block, None);
        assert_eq!(result.block_type, BlockType::Config);
        assert_eq!(result.language, Some(Language::CiscoIos));
        assert_eq!(result.confidence_score, 0.85);
    }

    #[test]
    fn log_lines_need_timestamp_and_severity() {
        let registry = GrammarRegistry::new();
        let validator = Validator::new(&registry);
        let block = candidate(
            "2024-01-01T12:00:00 ERROR disk full\n2024-01-01T12:00:05 INFO retrying\n",
            None,
        );
        let result = validator.validate_block(&block, None);
        assert_eq!(result.block_type, BlockType::Log);
        assert_eq!(result.confidence_score, 0.80);
    }

    #[test]
    fn unclassifiable_prose_is_unknown_with_halved_confidence() {
        let registry = GrammarRegistry::new();
        let validator = Validator::new(&registry);
        let block = candidate("This is just a normal paragraph of prose text.", None);
        let result = validator.validate_block(&block, None);
        assert_eq!(result.block_type, BlockType::Unknown);
        assert_eq!(result.confidence_score, 0.45);
    }
}
