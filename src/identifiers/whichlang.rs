//! Single-label backend (`langdetect`).
//!
//! Always commits to exactly one of 16 languages and carries no score,
//! so the probability is the implicit full mass. Deterministic by
//! construction, which the per-item reproducibility guarantee relies
//! on.
use whichlang::{detect_language, Lang};

use super::{Identifier, LanguageProb};
use crate::error::Error;

fn code(lang: Lang) -> &'static str {
    match lang {
        Lang::Ara => "ar",
        Lang::Cmn => "zh",
        Lang::Deu => "de",
        Lang::Eng => "en",
        Lang::Fra => "fr",
        Lang::Hin => "hi",
        Lang::Ita => "it",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Nld => "nl",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Spa => "es",
        Lang::Swe => "sv",
        Lang::Tur => "tr",
        Lang::Vie => "vi",
    }
}

pub struct Whichlang {
    name: String,
}

impl Whichlang {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Identifier for Whichlang {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, text: &str) -> Result<Option<Vec<LanguageProb>>, Error> {
        Ok(Some(vec![LanguageProb::new(
            code(detect_language(text)).to_string(),
            1.0,
        )]))
    }

    fn languages(&self) -> Option<Vec<String>> {
        let mut langs: Vec<String> = [
            Lang::Ara,
            Lang::Cmn,
            Lang::Deu,
            Lang::Eng,
            Lang::Fra,
            Lang::Hin,
            Lang::Ita,
            Lang::Jpn,
            Lang::Kor,
            Lang::Nld,
            Lang::Por,
            Lang::Rus,
            Lang::Spa,
            Lang::Swe,
            Lang::Tur,
            Lang::Vie,
        ]
        .iter()
        .map(|l| code(*l).to_string())
        .collect();
        langs.sort_unstable();
        Some(langs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_is_deterministic() {
        let lid = Whichlang::new("langdetect");
        let text = "Die Schweiz ist ein schönes Land und die Berge sind hoch.";
        let a = lid.identify(text).unwrap().unwrap();
        let b = lid.identify(text).unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].lang, "de");
        assert_eq!(a[0].prob, 1.0);
    }

    #[test]
    fn test_no_luxembourgish() {
        let lid = Whichlang::new("langdetect");
        assert!(!lid.languages().unwrap().contains(&"lb".to_string()));
    }
}
