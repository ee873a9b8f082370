//! Review labels and the mapping from raw dataset values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CandorError, Result};

/// Canonical class of a review.
///
/// The discriminants are the integer encoding used inside the model:
/// `Genuine` is the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Label {
    Fake = 0,
    Genuine = 1,
}

impl Label {
    /// Both labels in code order.
    pub const ALL: [Label; 2] = [Label::Fake, Label::Genuine];

    /// Integer code of this label.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Label for an integer code.
    pub fn from_code(code: u8) -> Option<Label> {
        match code {
            0 => Some(Label::Fake),
            1 => Some(Label::Genuine),
            _ => None,
        }
    }

    /// Short machine name.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Fake => "fake",
            Label::Genuine => "genuine",
        }
    }

    /// Human-readable name shown at the output boundary.
    pub fn display_name(self) -> &'static str {
        match self {
            Label::Fake => "Fake Review",
            Label::Genuine => "Genuine Review",
        }
    }

    /// The other label.
    pub fn opposite(self) -> Label {
        match self {
            Label::Fake => Label::Genuine,
            Label::Genuine => Label::Fake,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw dataset values accepted for each label, compared case-insensitively
/// after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelMapping {
    pub genuine: Vec<String>,
    pub fake: Vec<String>,
}

impl Default for LabelMapping {
    fn default() -> Self {
        LabelMapping {
            genuine: ["OR", "genuine", "real", "1"].map(String::from).to_vec(),
            fake: ["CG", "fake", "deceptive", "0"].map(String::from).to_vec(),
        }
    }
}

impl LabelMapping {
    /// Map a raw value to its label.
    pub fn parse(&self, raw: &str) -> Option<Label> {
        let raw = raw.trim();
        let matches = |values: &[String]| values.iter().any(|v| v.trim().eq_ignore_ascii_case(raw));

        if matches(&self.genuine) {
            Some(Label::Genuine)
        } else if matches(&self.fake) {
            Some(Label::Fake)
        } else {
            None
        }
    }

    /// Both sides must be non-empty and no value may map to both labels.
    pub fn validate(&self) -> Result<()> {
        if self.genuine.is_empty() || self.fake.is_empty() {
            return Err(CandorError::invalid_argument(
                "label mapping needs at least one value per label",
            ));
        }
        if let Some(shared) = self
            .genuine
            .iter()
            .find(|g| self.fake.iter().any(|f| f.trim().eq_ignore_ascii_case(g.trim())))
        {
            return Err(CandorError::invalid_argument(format!(
                "label value '{shared}' maps to both genuine and fake"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for label in Label::ALL {
            assert_eq!(Label::from_code(label.code()), Some(label));
        }
        assert_eq!(Label::from_code(7), None);
        assert_eq!(Label::Genuine.code(), 1);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Label::Genuine.display_name(), "Genuine Review");
        assert_eq!(Label::Fake.display_name(), "Fake Review");
        assert_eq!(Label::Fake.to_string(), "fake");
    }

    #[test]
    fn test_default_mapping() {
        let mapping = LabelMapping::default();
        assert_eq!(mapping.parse("OR"), Some(Label::Genuine));
        assert_eq!(mapping.parse(" cg "), Some(Label::Fake));
        assert_eq!(mapping.parse("Deceptive"), Some(Label::Fake));
        assert_eq!(mapping.parse("1"), Some(Label::Genuine));
        assert_eq!(mapping.parse("maybe"), None);
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_overlapping_mapping_is_invalid() {
        let mapping = LabelMapping {
            genuine: vec!["yes".into()],
            fake: vec!["YES".into()],
        };
        assert!(mapping.validate().is_err());
    }

    #[test]
    fn test_serde_label_names() {
        assert_eq!(serde_json::to_string(&Label::Genuine).unwrap(), "\"genuine\"");
    }
}
