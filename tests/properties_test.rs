//! Property tests for cleaning, vectorization and confidence rounding.

use candor::analysis::analyzer::ReviewCleaner;
use candor::ml::tfidf::{TfIdfVectorizer, VectorizerConfig};
use candor::scoring::round_confidence;
use proptest::prelude::*;

proptest! {
    #[test]
    fn cleaning_is_idempotent(text in "\\PC{0,200}") {
        let cleaner = ReviewCleaner::new().unwrap();
        let once = cleaner.clean(&text).unwrap();
        let twice = cleaner.clean(&once).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once, cleaner.clean(&text).unwrap());
    }

    #[test]
    fn cleaned_text_is_lowercase_letters_and_single_spaces(text in "\\PC{0,200}") {
        let cleaner = ReviewCleaner::new().unwrap();
        let cleaned = cleaner.clean(&text).unwrap();
        prop_assert!(cleaned.chars().all(|c| c.is_ascii_lowercase() || c == ' '));
        prop_assert!(!cleaned.contains("  "));
        prop_assert!(!cleaned.starts_with(' ') && !cleaned.ends_with(' '));
    }

    #[test]
    fn transform_is_unit_norm_or_zero(text in "[a-z ]{0,120}") {
        let vectorizer = TfIdfVectorizer::fit(
            &["good product works", "bad product broke", "works well enough"],
            VectorizerConfig::default(),
        )
        .unwrap();
        let vector = vectorizer.transform(&text).unwrap();
        prop_assert_eq!(vector.dim(), vectorizer.vocabulary_size());
        if !vector.is_zero() {
            prop_assert!((vector.l2_norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rounded_confidence_forms_agree(p in 0.0f64..=1.0) {
        let (fraction, percent) = round_confidence(p);
        prop_assert!(percent <= 100);
        prop_assert!((0.0..=1.0).contains(&fraction));
        prop_assert_eq!(fraction, f64::from(percent) / 100.0);
        prop_assert!((fraction - p).abs() <= 0.005 + 1e-12);
    }
}
