//! Trigram backend (`langid`).
//!
//! Single-shot probabilistic classifier over character trigrams; emits
//! one label with a confidence in `[0, 1]`.
use whatlang::detect;

use super::{Identifier, LanguageProb};
use crate::error::Error;
use crate::lang::{to_iso639_1, ISO_639_3_TO_1};

pub struct Whatlang {
    name: String,
}

impl Whatlang {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Identifier for Whatlang {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, text: &str) -> Result<Option<Vec<LanguageProb>>, Error> {
        Ok(detect(text).map(|info| {
            vec![LanguageProb::new(
                to_iso639_1(info.lang().code()).to_string(),
                info.confidence(),
            )]
        }))
    }

    fn languages(&self) -> Option<Vec<String>> {
        let mut langs: Vec<String> = ISO_639_3_TO_1.values().map(|c| c.to_string()).collect();
        langs.sort_unstable();
        Some(langs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_german() {
        let lid = Whatlang::new("langid");
        let preds = lid
            .identify("Die Schweiz ist ein schönes Land und die Berge sind hoch.")
            .unwrap()
            .unwrap();
        assert_eq!(preds[0].lang, "de");
        assert!(preds[0].prob > 0.0 && preds[0].prob <= 1.0);
    }

    #[test]
    fn test_codes_are_two_letter() {
        let lid = Whatlang::new("langid");
        let preds = lid
            .identify("Le chat noir dort tranquillement devant la cheminée du salon.")
            .unwrap()
            .unwrap();
        assert_eq!(preds[0].lang.len(), 2);
    }
}
