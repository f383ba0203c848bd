//! Rule-augmented n-gram backend (`lingua`).
//!
//! The only bundled backend that knows Luxembourgish. Confidence
//! values come back for every model language, normalized to sum to
//! one; only the top slice is worth keeping.
use lingua::{LanguageDetector, LanguageDetectorBuilder};

use super::{Identifier, LanguageProb};
use crate::error::Error;

pub struct Lingua {
    detector: LanguageDetector,
    name: String,
    pub k: usize,
}

impl Lingua {
    pub fn new(name: &str) -> Self {
        let detector = LanguageDetectorBuilder::from_all_languages().build();
        Self {
            detector,
            name: name.to_string(),
            k: 3,
        }
    }
}

impl Identifier for Lingua {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, text: &str) -> Result<Option<Vec<LanguageProb>>, Error> {
        let ranked = self.detector.compute_language_confidence_values(text);

        let result: Vec<LanguageProb> = ranked
            .into_iter()
            .take(self.k)
            .filter(|(_, prob)| *prob > 0.0)
            .map(|(language, prob)| {
                LanguageProb::new(language.iso_code_639_1().to_string(), prob)
            })
            .collect();

        if result.is_empty() {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }

    fn languages(&self) -> Option<Vec<String>> {
        let mut langs: Vec<String> = lingua::Language::all()
            .into_iter()
            .map(|l| l.iso_code_639_1().to_string())
            .collect();
        langs.sort_unstable();
        Some(langs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_luxembourgish() {
        let lid = Lingua::new("lingua");
        let preds = lid
            .identify("D'Kanner spillen am Gaart hannert dem Haus an der Sonn.")
            .unwrap()
            .unwrap();
        assert_eq!(preds[0].lang, "lb");
    }

    #[test]
    fn test_ranked_descending() {
        let lid = Lingua::new("lingua");
        let preds = lid
            .identify("Le chat noir dort tranquillement devant la cheminée.")
            .unwrap()
            .unwrap();
        for pair in preds.windows(2) {
            assert!(pair[0].prob >= pair[1].prob);
        }
        assert_eq!(preds[0].lang, "fr");
    }

    #[test]
    fn test_knows_luxembourgish() {
        let lid = Lingua::new("lingua");
        assert!(lid.languages().unwrap().contains(&"lb".to_string()));
    }
}
