//! Severity keyword lexicon
//!
//! An ordered table of (tier, keywords) rows. Classification walks the table
//! top to bottom and the first tier with a matching keyword wins, so a
//! fragment that mentions both "critical" and "minor" is Critical.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::Severity;

/// One row of the lexicon table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconTier {
    pub severity: Severity,
    pub keywords: Vec<String>,
}

impl LexiconTier {
    pub fn new(severity: Severity, keywords: &[&str]) -> Self {
        Self {
            severity,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Lexicon validation errors
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Lexicon must define exactly {expected} tiers, found {found}")]
    TierCount { expected: usize, found: usize },

    #[error("Lexicon tier {position} must be {expected}, found {found}")]
    OutOfOrder {
        position: usize,
        expected: Severity,
        found: Severity,
    },

    #[error("Lexicon tier {0} has no keywords")]
    EmptyTier(Severity),

    #[error("Lexicon tier {0} contains a blank keyword")]
    BlankKeyword(Severity),

    #[error("Failed to compile keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled severity lexicon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<LexiconTier>", into = "Vec<LexiconTier>")]
pub struct SeverityLexicon {
    tiers: Vec<LexiconTier>,
    matchers: Vec<(Severity, Regex)>,
}

impl SeverityLexicon {
    /// Build a lexicon from rows given in priority order
    pub fn new(tiers: Vec<LexiconTier>) -> Result<Self, LexiconError> {
        if tiers.len() != Severity::ALL.len() {
            return Err(LexiconError::TierCount {
                expected: Severity::ALL.len(),
                found: tiers.len(),
            });
        }

        let mut matchers = Vec::with_capacity(tiers.len());
        for (position, (tier, expected)) in tiers.iter().zip(Severity::ALL).enumerate() {
            if tier.severity != expected {
                return Err(LexiconError::OutOfOrder {
                    position,
                    expected,
                    found: tier.severity,
                });
            }
            if tier.keywords.is_empty() {
                return Err(LexiconError::EmptyTier(tier.severity));
            }
            if tier.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(LexiconError::BlankKeyword(tier.severity));
            }
            matchers.push((tier.severity, compile_tier(&tier.keywords)?));
        }

        Ok(Self { tiers, matchers })
    }

    /// Classify a fragment; `None` when no keyword from any tier occurs
    pub fn classify(&self, fragment: &str) -> Option<Severity> {
        self.matchers
            .iter()
            .find(|(_, pattern)| pattern.is_match(fragment))
            .map(|(severity, _)| *severity)
    }

    pub fn tiers(&self) -> &[LexiconTier] {
        &self.tiers
    }

    pub fn keywords(&self, severity: Severity) -> &[String] {
        self.tiers
            .iter()
            .find(|t| t.severity == severity)
            .map(|t| t.keywords.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for SeverityLexicon {
    fn default() -> Self {
        Self::new(default_tiers()).expect("built-in lexicon is valid")
    }
}

impl TryFrom<Vec<LexiconTier>> for SeverityLexicon {
    type Error = LexiconError;

    fn try_from(tiers: Vec<LexiconTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<SeverityLexicon> for Vec<LexiconTier> {
    fn from(lexicon: SeverityLexicon) -> Self {
        lexicon.tiers
    }
}

/// Built-in keyword table
///
/// Besides explicit tier names, the words gap analyses use for absent or
/// obligatory controls ("missing", "required", "should") count as findings.
pub fn default_tiers() -> Vec<LexiconTier> {
    vec![
        LexiconTier::new(
            Severity::Critical,
            &[
                "critical",
                "severe",
                "urgent",
                "immediately",
                "immediate action",
                "missing",
                "absent",
                "mandatory",
            ],
        ),
        LexiconTier::new(
            Severity::High,
            &["high", "high priority", "high risk", "significant", "important", "required"],
        ),
        LexiconTier::new(
            Severity::Medium,
            &["medium", "moderate", "medium priority", "should", "recommended"],
        ),
        LexiconTier::new(
            Severity::Low,
            &["low", "low priority", "minor", "suggestion", "suggested", "optional"],
        ),
    ]
}

/// Whole-word, case-insensitive alternation; inner whitespace matches any run
fn compile_tier(keywords: &[String]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| {
            k.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();

    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_classifies_each_tier() {
        let lexicon = SeverityLexicon::default();
        assert_eq!(lexicon.classify("Severe exposure of admin accounts"), Some(Severity::Critical));
        assert_eq!(lexicon.classify("Significant weakness in logging"), Some(Severity::High));
        assert_eq!(lexicon.classify("moderate gap in training"), Some(Severity::Medium));
        assert_eq!(lexicon.classify("Minor wording issue"), Some(Severity::Low));
        assert_eq!(lexicon.classify("The policy covers backups"), None);
    }

    #[test]
    fn test_default_lexicon_covers_obligation_words() {
        let lexicon = SeverityLexicon::default();
        assert_eq!(lexicon.classify("Missing: MFA for remote access."), Some(Severity::Critical));
        assert_eq!(lexicon.classify("Incident response plan is absent."), Some(Severity::Critical));
        assert_eq!(lexicon.classify("Encryption at rest is mandatory"), Some(Severity::Critical));
        assert_eq!(lexicon.classify("Annual review is required"), Some(Severity::High));
        assert_eq!(lexicon.classify("Backups should be tested."), Some(Severity::Medium));
        assert_eq!(lexicon.classify("Recommended: rotate keys yearly"), Some(Severity::Medium));
        assert_eq!(lexicon.classify("Requirements are documented"), None);
    }

    #[test]
    fn test_first_tier_wins() {
        let lexicon = SeverityLexicon::default();
        assert_eq!(
            lexicon.classify("Minor formatting, but a critical control is absent"),
            Some(Severity::Critical)
        );
        assert_eq!(lexicon.classify("LOW effort, HIGH impact"), Some(Severity::High));
    }

    #[test]
    fn test_matches_whole_words_only() {
        let lexicon = SeverityLexicon::default();
        assert_eq!(lexicon.classify("Follow the documented procedure"), None);
        assert_eq!(lexicon.classify("See the table below"), None);
        assert_eq!(lexicon.classify("Highlights of the review"), None);
    }

    #[test]
    fn test_multi_word_keywords_allow_any_spacing() {
        let lexicon = SeverityLexicon::new(vec![
            LexiconTier::new(Severity::Critical, &["immediate action"]),
            LexiconTier::new(Severity::High, &["high risk"]),
            LexiconTier::new(Severity::Medium, &["medium"]),
            LexiconTier::new(Severity::Low, &["low priority"]),
        ])
        .unwrap();
        assert_eq!(lexicon.classify("needs IMMEDIATE   action"), Some(Severity::Critical));
        assert_eq!(lexicon.classify("low\tpriority cleanup"), Some(Severity::Low));
        assert_eq!(lexicon.classify("a high bar"), None);
    }

    #[test]
    fn test_rejects_out_of_order_tiers() {
        let mut tiers = default_tiers();
        tiers.swap(0, 1);
        let err = SeverityLexicon::new(tiers).unwrap_err();
        assert!(matches!(err, LexiconError::OutOfOrder { position: 0, .. }));
    }

    #[test]
    fn test_rejects_empty_tier() {
        let mut tiers = default_tiers();
        tiers[2].keywords.clear();
        let err = SeverityLexicon::new(tiers).unwrap_err();
        assert!(matches!(err, LexiconError::EmptyTier(Severity::Medium)));
    }

    #[test]
    fn test_rejects_missing_tier() {
        let mut tiers = default_tiers();
        tiers.pop();
        assert!(matches!(
            SeverityLexicon::new(tiers),
            Err(LexiconError::TierCount { expected: 4, found: 3 })
        ));
    }

    #[test]
    fn test_lexicon_deserializes_from_rows() {
        let json = r#"[
            {"severity": "critical", "keywords": ["blocker"]},
            {"severity": "high", "keywords": ["major"]},
            {"severity": "medium", "keywords": ["medium"]},
            {"severity": "low", "keywords": ["nit"]}
        ]"#;
        let lexicon: SeverityLexicon = serde_json::from_str(json).unwrap();
        assert_eq!(lexicon.classify("Blocker: no backups"), Some(Severity::Critical));
        assert_eq!(lexicon.keywords(Severity::Low), &["nit".to_string()]);
    }
}
