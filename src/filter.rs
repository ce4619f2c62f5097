//! Precision filter: seven ordered rules that reject [`ValidatedBlock`]s
//! likely to be false positives from the segmenter/validator stages.
//! First matching rule wins; a block that clears all seven is accepted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{
    AcceptedBlock, BlockType, FilterReport, Language, RejectedBlock, RejectionRule, ValidatedBlock,
};

const MIN_LINES: usize = 3;
const MIN_CHARS: usize = 30;
const MIN_CONFIDENCE: f64 = 0.50;

const PROSE_INDICATORS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "and", "or", "but", "however", "therefore",
    "this", "that", "these", "those",
];

const PYTHON_KEYWORDS: &[&str] = &["def", "class", "import", "from", "if", "elif", "else", "try", "except"];

static INLINE_VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\w+\s*=\s*.+$").unwrap());
static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s+[A-Z]").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Result of a single [`should_accept`] call, before it's folded into an
/// [`AcceptedBlock`] or [`RejectedBlock`].
enum Verdict {
    Accept,
    Reject { reason: String, rule: RejectionRule },
}

/// Apply the precision filter to one validated block.
fn should_accept(block: &ValidatedBlock) -> Verdict {
    let content = &block.content;
    let confidence = block.confidence_score;

    // Rule 1: minimum confidence threshold.
    if confidence < MIN_CONFIDENCE {
        return Verdict::Reject {
            reason: format!("Low confidence: {confidence:.2} < {MIN_CONFIDENCE}"),
            rule: RejectionRule::ConfidenceThreshold,
        };
    }

    // Rule 2: minimum size requirements.
    let lines = content.matches('\n').count() + 1;
    let char_count = content.trim().chars().count();

    if lines < MIN_LINES {
        return Verdict::Reject {
            reason: format!("Too few lines: {lines} < {MIN_LINES}"),
            rule: RejectionRule::MinimumLines,
        };
    }

    if char_count < MIN_CHARS {
        return Verdict::Reject {
            reason: format!("Too short: {char_count} < {MIN_CHARS}"),
            rule: RejectionRule::MinimumChars,
        };
    }

    // Rule 3: inline variable assignment, code blocks under 5 lines only.
    if block.block_type == BlockType::Code && lines < 5 && is_inline_variable(content) {
        return Verdict::Reject {
            reason: "Inline variable assignment without context".to_string(),
            rule: RejectionRule::InlineVariable,
        };
    }

    // Rule 4: syntax integrity for code blocks.
    if block.block_type == BlockType::Code {
        if let Err(reason) = check_syntax_integrity(content) {
            return Verdict::Reject {
                reason,
                rule: RejectionRule::SyntaxIntegrity,
            };
        }
    }

    // Rule 5: prose detection for code blocks.
    if block.block_type == BlockType::Code && looks_like_prose(content) {
        return Verdict::Reject {
            reason: "Content appears to be natural language prose".to_string(),
            rule: RejectionRule::ProseDetection,
        };
    }

    // Rule 6: context density for low-confidence blocks.
    if confidence < 0.75 {
        if let Err(reason) = check_context_density(content) {
            return Verdict::Reject {
                reason,
                rule: RejectionRule::ContextDensity,
            };
        }
    }

    // Rule 7: Python indentation sanity check.
    if block.language == Some(Language::Python) || looks_like_python(content) {
        if !check_indentation(content) {
            return Verdict::Reject {
                reason: "Invalid or mixed indentation".to_string(),
                rule: RejectionRule::IndentationCheck,
            };
        }
    }

    Verdict::Accept
}

fn is_inline_variable(content: &str) -> bool {
    let lines: Vec<&str> = content.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    if lines.len() == 1 {
        return INLINE_VAR_RE.is_match(lines[0]);
    }

    if lines.len() <= 3 {
        let assignment_count = lines.iter().filter(|l| INLINE_VAR_RE.is_match(l)).count();
        if assignment_count == lines.len() {
            return true;
        }
    }

    false
}

fn check_syntax_integrity(content: &str) -> Result<(), String> {
    let mut stack = Vec::new();

    for c in content.chars() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' => match stack.pop() {
                Some('(') => {}
                None => return Err("Unmatched closing bracket: )".to_string()),
                _ => return Err("Mismatched brackets".to_string()),
            },
            ']' => match stack.pop() {
                Some('[') => {}
                None => return Err("Unmatched closing bracket: ]".to_string()),
                _ => return Err("Mismatched brackets".to_string()),
            },
            '}' => match stack.pop() {
                Some('{') => {}
                None => return Err("Unmatched closing bracket: }".to_string()),
                _ => return Err("Mismatched brackets".to_string()),
            },
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(format!("Unclosed brackets: {stack:?}"));
    }

    let single_quotes = content.matches('\'').count();
    let double_quotes = content.matches('"').count();

    if single_quotes % 2 != 0 || double_quotes % 2 != 0 {
        return Err("Unmatched quotes".to_string());
    }

    Ok(())
}

fn check_indentation(content: &str) -> bool {
    let has_tabs = content.lines().any(|l| l.contains('\t'));
    let has_spaces = content.lines().any(|l| l.starts_with(' '));
    !(has_tabs && has_spaces)
}

fn looks_like_python(content: &str) -> bool {
    let has_keyword = WORD_RE
        .find_iter(content)
        .any(|m| PYTHON_KEYWORDS.contains(&m.as_str()));
    has_keyword && content.contains(':')
}

fn looks_like_prose(content: &str) -> bool {
    let words: Vec<String> = WORD_RE
        .find_iter(content)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    if words.is_empty() {
        return false;
    }

    let prose_word_count = words.iter().filter(|w| PROSE_INDICATORS.contains(&w.as_str())).count();
    let prose_ratio = prose_word_count as f64 / words.len() as f64;

    if prose_ratio > 0.20 {
        return true;
    }

    SENTENCE_RE.find_iter(content).count() > 2
}

fn check_context_density(content: &str) -> Result<(), String> {
    const TECHNICAL_CHARS: &str = "{}[]()<>;:=";

    let tech_char_count = content.chars().filter(|c| TECHNICAL_CHARS.contains(*c)).count();
    let total_chars = content.chars().count();

    if total_chars == 0 {
        return Err("Empty content".to_string());
    }

    let tech_density = tech_char_count as f64 / total_chars as f64;

    if tech_density < 0.05 {
        return Err(format!("Low technical density: {:.2}%", tech_density * 100.0));
    }

    Ok(())
}

/// Run the filter over an entire document's validated blocks, splitting
/// them into accepted and rejected, each annotated with why.
pub fn batch_filter(blocks: Vec<ValidatedBlock>) -> FilterReport {
    let mut report = FilterReport::default();

    for block in blocks {
        match should_accept(&block) {
            Verdict::Accept => report.accepted.push(AcceptedBlock {
                block,
                filter_passed: true,
            }),
            Verdict::Reject { reason, rule } => report.rejected.push(RejectedBlock {
                block,
                filter_passed: false,
                rejection_reason: reason,
                filtered_by: rule,
            }),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionMethod;

    fn block(content: &str, block_type: BlockType, confidence: f64) -> ValidatedBlock {
        ValidatedBlock {
            content: content.to_string(),
            start_line: 0,
            end_line: content.matches('\n').count(),
            detection_method: DetectionMethod::Indentation,
            block_type,
            language: None,
            confidence_score: confidence,
            validation_method: None,
            ast_nodes: None,
        }
    }

    #[test]
    fn low_confidence_is_rejected_first() {
        let b = block("fn main() {\n    let x = 1;\n    let y = 2;\n}", BlockType::Code, 0.3);
        let report = batch_filter(vec![b]);
        assert_eq!(report.accepted.len(), 0);
        assert_eq!(report.rejected[0].filtered_by, RejectionRule::ConfidenceThreshold);
    }

    #[test]
    fn too_short_block_is_rejected_on_chars() {
        let b = block("a\nb\nc", BlockType::Code, 0.9);
        let report = batch_filter(vec![b]);
        assert_eq!(report.rejected[0].filtered_by, RejectionRule::MinimumChars);
    }

    #[test]
    fn well_formed_code_is_accepted() {
        let b = block(
            "fn handler(x: i32) -> i32 {\n    if x > 0 {\n        return x;\n    }\n    0\n}",
            BlockType::Code,
            0.95,
        );
        let report = batch_filter(vec![b]);
        assert_eq!(report.accepted.len(), 1);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn prose_flagged_even_with_braces() {
        let b = block(
            "The {quick} brown fox and the lazy dog are not a real program, however this is long enough.",
            BlockType::Code,
            0.9,
        );
        let report = batch_filter(vec![b]);
        assert_eq!(report.rejected[0].filtered_by, RejectionRule::ProseDetection);
    }

    #[test]
    fn mixed_tabs_and_spaces_fails_python_indentation_check() {
        let b = block(
            "def f():\n\tif True:\n        return 1\n    return 0\n",
            BlockType::Code,
            0.95,
        );
        let report = batch_filter(vec![b]);
        assert_eq!(report.rejected[0].filtered_by, RejectionRule::IndentationCheck);
    }
}
