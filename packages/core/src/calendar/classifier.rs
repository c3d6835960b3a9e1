//! Impact classification of free-text descriptors

use crate::calendar::types::Impact;

/// Maps a provider's impact descriptor to an [`Impact`] tier.
///
/// `None` means the descriptor names a tier we do not notify about.
pub trait ImpactClassifier: Send + Sync {
    fn classify(&self, descriptor: &str) -> Option<Impact>;
}

/// Substring classifier over two vocabularies, Strong checked first.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    strong: Vec<String>,
    moderate: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<S: Into<String>>(strong: Vec<S>, moderate: Vec<S>) -> Self {
        Self {
            strong: strong.into_iter().map(|s| s.into().to_lowercase()).collect(),
            moderate: moderate.into_iter().map(|s| s.into().to_lowercase()).collect(),
        }
    }
}

impl Default for KeywordClassifier {
    /// English and Arabic terms used by the investing.com calendar.
    fn default() -> Self {
        Self::new(vec!["high", "مرتفع"], vec!["medium", "moderate", "متوسط"])
    }
}

impl ImpactClassifier for KeywordClassifier {
    fn classify(&self, descriptor: &str) -> Option<Impact> {
        let text = descriptor.to_lowercase();
        if self.strong.iter().any(|word| text.contains(word.as_str())) {
            return Some(Impact::Strong);
        }
        if self.moderate.iter().any(|word| text.contains(word.as_str())) {
            return Some(Impact::Moderate);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_in_any_case_is_strong() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("High Volatility Expected"), Some(Impact::Strong));
        assert_eq!(classifier.classify("HIGH"), Some(Impact::Strong));
        assert_eq!(classifier.classify("تقلبات مرتفعة متوقعة"), Some(Impact::Strong));
    }

    #[test]
    fn medium_and_moderate_are_moderate() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("Medium Volatility Expected"), Some(Impact::Moderate));
        assert_eq!(classifier.classify("moderate"), Some(Impact::Moderate));
        assert_eq!(classifier.classify("تقلبات متوسطة"), Some(Impact::Moderate));
    }

    #[test]
    fn strong_vocabulary_wins_over_moderate() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("medium to high"), Some(Impact::Strong));
    }

    #[test]
    fn low_or_blank_is_dropped() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("Low Volatility Expected"), None);
        assert_eq!(classifier.classify(""), None);
    }

    #[test]
    fn custom_vocabulary_is_case_insensitive() {
        let classifier = KeywordClassifier::new(vec!["BULL3"], vec!["Bull2"]);
        assert_eq!(classifier.classify("bull3"), Some(Impact::Strong));
        assert_eq!(classifier.classify("BULL2"), Some(Impact::Moderate));
        assert_eq!(classifier.classify("bull1"), None);
    }
}
