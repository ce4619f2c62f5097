//! Splits free-form text into [`CandidateBlock`]s using three ordered
//! strategies: markdown fences, indentation runs, and character-density
//! sliding windows. Later strategies skip any line a higher-priority
//! strategy already claimed.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CandidateBlock, DetectionMethod};

const TECHNICAL_CHARS: &str = "{}[]()<>;:=+-*/%&|!~^#@$";

const KEYWORDS: &[&str] = &[
    "def", "class", "function", "var", "let", "const", "import", "export", "if", "else", "for",
    "while", "return", "void", "int", "string", "public", "private", "static", "async", "await",
    "try", "catch",
];

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```(\w+)?").unwrap());
static COMPLEXITY_FUNC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdef\b|\bfunction\b|\bpublic\b|\bprivate\b").unwrap());
static COMPLEXITY_FLOW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bif\b|\bfor\b|\bwhile\b|\bswitch\b").unwrap());
static COMPLEXITY_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\b|\binterface\b|\bstruct\b").unwrap());

/// Minimum lines a candidate must span to be kept, and the density-window
/// size, bundled so the three strategies stay consistent.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    min_block_lines: usize,
    density_window: usize,
    density_threshold: f64,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            min_block_lines: 3,
            density_window: 5,
            density_threshold: 0.15,
        }
    }
}

impl Segmenter {
    pub fn new(min_block_lines: usize) -> Self {
        Self {
            min_block_lines,
            ..Self::default()
        }
    }

    pub fn from_config(config: &crate::config::SegmenterConfig) -> Self {
        Self {
            min_block_lines: config.min_block_lines,
            density_window: config.density_window,
            density_threshold: config.density_threshold,
        }
    }

    /// Run all three strategies in priority order and deduplicate the
    /// result by disjoint line ranges, confidence-descending.
    pub fn segment(&self, text: &str) -> Vec<CandidateBlock> {
        let lines: Vec<&str> = text.split('\n').collect();

        let markdown_blocks = self.extract_markdown_blocks(&lines);
        let mut marked_lines: HashSet<usize> = HashSet::new();
        for block in &markdown_blocks {
            marked_lines.extend(block.start_line..=block.end_line);
        }

        let indent_blocks = self.extract_indented_blocks(&lines, &marked_lines);
        for block in &indent_blocks {
            marked_lines.extend(block.start_line..=block.end_line);
        }

        let density_blocks = self.extract_density_blocks(&lines, &marked_lines);

        let mut candidates = markdown_blocks;
        candidates.extend(indent_blocks);
        candidates.extend(density_blocks);

        Self::deduplicate_blocks(candidates)
    }

    fn extract_markdown_blocks(&self, lines: &[&str]) -> Vec<CandidateBlock> {
        let mut blocks = Vec::new();

        let mut in_block = false;
        let mut block_start = 0usize;
        let mut block_lines: Vec<&str> = Vec::new();
        let mut language_hint: Option<String> = None;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            let fence_match = FENCE_RE.captures(trimmed);

            if let Some(caps) = fence_match.as_ref() {
                if !in_block {
                    in_block = true;
                    block_start = i;
                    language_hint = caps.get(1).map(|m| m.as_str().to_string());
                    block_lines = Vec::new();
                    continue;
                }
            }

            if trimmed.starts_with("```") && in_block {
                if block_lines.len() >= self.min_block_lines {
                    blocks.push(CandidateBlock {
                        content: block_lines.join("\n"),
                        start_line: block_start + 1,
                        end_line: i - 1,
                        detection_method: DetectionMethod::Markdown,
                        confidence: 0.95,
                        language_hint: language_hint.clone(),
                    });
                }
                in_block = false;
                block_lines = Vec::new();
                language_hint = None;
            } else if in_block {
                block_lines.push(line);
            }
        }

        blocks
    }

    fn extract_indented_blocks(
        &self,
        lines: &[&str],
        marked_lines: &HashSet<usize>,
    ) -> Vec<CandidateBlock> {
        let mut blocks = Vec::new();

        let mut current_block: Vec<&str> = Vec::new();
        let mut block_start: Option<usize> = None;

        for (i, line) in lines.iter().enumerate() {
            if marked_lines.contains(&i) {
                if current_block.len() >= self.min_block_lines {
                    blocks.push(CandidateBlock {
                        content: current_block.join("\n"),
                        start_line: block_start.unwrap(),
                        end_line: i - 1,
                        detection_method: DetectionMethod::Indentation,
                        confidence: 0.75,
                        language_hint: None,
                    });
                }
                current_block = Vec::new();
                block_start = None;
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            let significant = !line.trim().is_empty() && (indent >= 4 || line.starts_with('\t'));

            if significant {
                if current_block.is_empty() {
                    block_start = Some(i);
                }
                current_block.push(line);
            } else if current_block.len() >= self.min_block_lines {
                let block_text = current_block.join("\n");
                if technical_density(&block_text) > 0.15 || block_complexity(&block_text) >= 2 {
                    blocks.push(CandidateBlock {
                        content: block_text,
                        start_line: block_start.unwrap(),
                        end_line: i - 1,
                        detection_method: DetectionMethod::Indentation,
                        confidence: 0.85,
                        language_hint: None,
                    });
                }
                current_block = Vec::new();
                block_start = None;
            } else {
                current_block = Vec::new();
                block_start = None;
            }
        }

        blocks
    }

    fn extract_density_blocks(
        &self,
        lines: &[&str],
        marked_lines: &HashSet<usize>,
    ) -> Vec<CandidateBlock> {
        let mut blocks = Vec::new();
        if lines.len() <= self.density_window {
            return blocks;
        }

        let mut i = 0usize;
        while i < lines.len() - self.density_window {
            if marked_lines.contains(&i) {
                i += 1;
                continue;
            }

            let window_text = lines[i..i + self.density_window].join("\n");
            let density = technical_density(&window_text);

            if density > self.density_threshold {
                let start = i;
                let mut end = i + self.density_window;

                while end < lines.len() && !marked_lines.contains(&end) {
                    if technical_density(lines[end]) > self.density_threshold * 0.8 {
                        end += 1;
                    } else {
                        break;
                    }
                }

                if end - start >= self.min_block_lines {
                    let block_content = lines[start..end].join("\n");
                    let complexity = block_complexity(&block_content);

                    if complexity >= 3 || density > 0.30 {
                        blocks.push(CandidateBlock {
                            content: block_content,
                            start_line: start,
                            end_line: end - 1,
                            detection_method: DetectionMethod::Density,
                            confidence: density.min(0.60),
                            language_hint: None,
                        });
                    }
                }

                i = end;
            } else {
                i += 1;
            }
        }

        blocks
    }

    fn deduplicate_blocks(blocks: Vec<CandidateBlock>) -> Vec<CandidateBlock> {
        if blocks.is_empty() {
            return blocks;
        }

        let mut sorted_blocks = blocks;
        sorted_blocks.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());

        let mut kept: Vec<CandidateBlock> = Vec::new();
        let mut used_lines: HashSet<usize> = HashSet::new();

        for block in sorted_blocks {
            let block_lines: HashSet<usize> = (block.start_line..=block.end_line).collect();
            if block_lines.is_disjoint(&used_lines) {
                used_lines.extend(block_lines);
                kept.push(block);
            }
        }

        kept.sort_by_key(|b| b.start_line);
        kept
    }
}

/// Ratio of technical-character density (0.7 weight) and keyword density
/// (0.3 weight), in `[0, 1]`.
fn technical_density(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let tech_count = text.chars().filter(|c| TECHNICAL_CHARS.contains(*c)).count();
    let words: Vec<&str> = text.split_whitespace().collect();
    let keyword_count = words
        .iter()
        .filter(|w| KEYWORDS.contains(&w.to_lowercase().as_str()))
        .count();

    let char_density = tech_count as f64 / text.chars().count().max(1) as f64;
    let keyword_density = keyword_count as f64 / words.len().max(1) as f64;

    (char_density * 0.7) + (keyword_density * 0.3)
}

/// Structural complexity score: function/control-flow/class keyword
/// occurrences plus one point each for balanced-looking `{}`/`()`.
fn block_complexity(block: &str) -> usize {
    let mut score = 0;
    score += COMPLEXITY_FUNC_RE.find_iter(block).count();
    score += COMPLEXITY_FLOW_RE.find_iter(block).count();
    score += COMPLEXITY_CLASS_RE.find_iter(block).count();
    if block.contains('{') && block.contains('}') {
        score += 1;
    }
    if block.contains('(') && block.contains(')') {
        score += 1;
    }
    score
}
