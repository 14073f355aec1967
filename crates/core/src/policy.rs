use crate::models::OutcomeReason;
use crate::normalize::token_count;

pub const MIN_TOKENS: usize = 5;

const OFFENSIVE_TERMS: [&str; 4] = ["burro", "idiota", "otário", "imbecil"];

const SPAM_PHRASES: [&str; 4] = [
    "promoção imperdível",
    "ganhe dinheiro",
    "clique aqui",
    "oferta exclusiva",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    TooShort,
    Offensive,
    Spam,
    Pass,
}

impl FilterVerdict {
    pub fn rejection_reason(self) -> Option<OutcomeReason> {
        match self {
            Self::TooShort => Some(OutcomeReason::TooShort),
            Self::Offensive => Some(OutcomeReason::Offensive),
            Self::Spam => Some(OutcomeReason::Spam),
            Self::Pass => None,
        }
    }
}

/// Cheap gate applied to normalized text before any model is consulted.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    offensive: Vec<String>,
    spam: Vec<String>,
    min_tokens: usize,
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(
            OFFENSIVE_TERMS.iter().map(|term| term.to_string()).collect(),
            SPAM_PHRASES.iter().map(|phrase| phrase.to_string()).collect(),
            MIN_TOKENS,
        )
    }
}

impl KeywordFilter {
    pub fn new(offensive: Vec<String>, spam: Vec<String>, min_tokens: usize) -> Self {
        Self {
            offensive: lowercase_all(offensive),
            spam: lowercase_all(spam),
            min_tokens,
        }
    }

    pub fn min_tokens(&self) -> usize {
        self.min_tokens
    }

    /// Checks run in order: length, offensive terms, spam phrases.
    pub fn evaluate(&self, normalized: &str) -> FilterVerdict {
        if token_count(normalized) < self.min_tokens {
            return FilterVerdict::TooShort;
        }

        let lower = normalized.to_lowercase();
        if contains_any(&lower, &self.offensive) {
            return FilterVerdict::Offensive;
        }
        if contains_any(&lower, &self.spam) {
            return FilterVerdict::Spam;
        }

        FilterVerdict::Pass
    }
}

fn lowercase_all(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

fn contains_any(input: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| input.contains(needle.as_str()))
}
