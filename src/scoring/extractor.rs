//! Finding extraction from gap-analysis prose
//!
//! The model's answer is split into fragments: every non-empty line, further
//! split into sentences when it holds more than one. A line is fragmented on
//! its own, so appending text never changes the fragments before it.
//! Headings set the category for the fragments below them. A heading that
//! carries a severity label and a body (`### Critical: no MFA`) is a finding
//! like any other labelled line.

use super::lexicon::SeverityLexicon;
use super::models::Finding;

/// Longest leading label accepted as a category
const MAX_LABEL_CHARS: usize = 60;

/// Pulls severity-tagged findings out of free text
#[derive(Debug, Clone, Default)]
pub struct ScoreExtractor {
    lexicon: SeverityLexicon,
}

impl ScoreExtractor {
    pub fn new(lexicon: SeverityLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &SeverityLexicon {
        &self.lexicon
    }

    /// Extract findings in source order
    pub fn extract(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut section: Option<String> = None;

        for fragment in fragments(text) {
            let subject = match section_heading(fragment) {
                Some(heading) if !self.is_labelled_gap(heading) => {
                    section = Some(heading.to_string());
                    continue;
                }
                Some(heading) => heading,
                None => fragment,
            };

            let Some(severity) = self.lexicon.classify(fragment) else {
                continue;
            };

            let category = split_label(subject)
                .0
                .map(str::to_string)
                .or_else(|| section.clone());

            findings.push(Finding::new(fragment.to_string(), severity, category));
        }

        findings
    }

    /// `Label: body` where the label itself names a severity
    fn is_labelled_gap(&self, heading: &str) -> bool {
        match split_label(heading) {
            (Some(label), _) => self.lexicon.classify(label).is_some(),
            (None, _) => false,
        }
    }
}

/// Split text into trimmed, non-empty fragments
pub(crate) fn fragments(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .flat_map(|line| {
            if line.starts_with('#') {
                vec![line]
            } else {
                split_sentences(line)
            }
        })
        .collect()
}

/// Split on `.`, `!` or `?` followed by whitespace
///
/// A leading ordinal such as `1.` is not a sentence end.
fn split_sentences(line: &str) -> Vec<&str> {
    let marker_len = line.len() - strip_list_marker(line).len();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if idx < marker_len || !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(_, next)) = chars.peek() {
            if next.is_whitespace() {
                let end = idx + ch.len_utf8();
                let sentence = line[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let tail = line[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Heading text if the fragment is a section header
///
/// Recognizes markdown headings (`## Title`), fully emphasized lines
/// (`**Title**`) and label-only lines (`CRITICAL GAPS:`).
fn section_heading(fragment: &str) -> Option<&str> {
    if fragment.starts_with('#') {
        let title = strip_emphasis(fragment.trim_start_matches('#').trim());
        return (!title.is_empty()).then_some(title);
    }

    let unmarked = strip_list_marker(fragment);
    if unmarked.len() > 4
        && unmarked.starts_with("**")
        && unmarked.ends_with("**")
        && !unmarked[2..unmarked.len() - 2].contains("**")
    {
        let title = strip_emphasis(unmarked).trim_end_matches(':').trim();
        return (!title.is_empty()).then_some(title);
    }

    let plain = strip_emphasis(unmarked);
    let label = plain.strip_suffix(':')?.trim();
    let label = strip_emphasis(label);
    if !label.is_empty() && label.chars().count() <= MAX_LABEL_CHARS && !label.contains(':') {
        Some(label)
    } else {
        None
    }
}

/// Split a fragment into its leading label (if any) and the remaining body
pub(crate) fn split_label(fragment: &str) -> (Option<&str>, &str) {
    let unmarked = strip_list_marker(fragment);
    let content = unmarked.trim_start_matches(['*', '_']);

    if let Some((head, rest)) = content.split_once(':') {
        let label = strip_emphasis(head);
        let rest = rest.trim_start_matches(['*', '_']);
        let body = strip_emphasis(rest);
        let is_label = !label.is_empty()
            && label.chars().count() <= MAX_LABEL_CHARS
            && label.chars().any(char::is_alphabetic)
            && rest.starts_with(char::is_whitespace)
            && !body.is_empty();
        if is_label {
            return (Some(label), body);
        }
    }

    (None, strip_emphasis(unmarked))
}

/// Drop a leading bullet (`-`, `*`, `+`) or ordinal (`1.`, `2)`) marker
fn strip_list_marker(fragment: &str) -> &str {
    let trimmed = fragment.trim_start();

    for bullet in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = trimmed.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }

    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')']) {
            if after.starts_with(char::is_whitespace) {
                return after.trim_start();
            }
        }
    }

    trimmed
}

fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches(['*', '_']).trim()
}
