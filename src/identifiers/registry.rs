//! Classifier registry.
//!
//! Binds configured classifier names to backends. Names are a closed
//! set; an unknown name or an unloadable model is fatal at startup so
//! per-item processing never hits an unconfigured classifier.
use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};

use super::{
    Composite, FastText, Identifier, Lingua, LidOutput, SkipReason, Whatlang, Whichlang,
    IMPRESSO_FT, IMPRESSO_PIPELINE, LANGDETECT, LANGID, LINGUA, WP_FT,
};
use crate::error::Error;

/// Prediction parameters of the fastText backends.
const FT_TOP_K: i32 = 3;
const FT_THRESHOLD: f32 = 0.05;

fn model_id(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct Registry {
    lids: Vec<Box<dyn Identifier>>,
    model_versions: BTreeMap<String, String>,
    minimal_text_length: usize,
}

impl Registry {
    /// Build backends for `names`, in configuration order.
    ///
    /// # Errors
    /// Unknown classifier names and missing/unloadable models abort
    /// the worker.
    pub fn new(
        names: &[String],
        impresso_ft: Option<&Path>,
        wp_ft: Option<&Path>,
        minimal_text_length: usize,
    ) -> Result<Self, Error> {
        if names.is_empty() {
            return Err(Error::Custom(
                "at least one classifier is needed, none configured".to_string(),
            ));
        }

        let mut lids: Vec<Box<dyn Identifier>> = Vec::with_capacity(names.len());
        let mut model_versions = BTreeMap::new();

        for name in names {
            let lid: Box<dyn Identifier> = match name.as_str() {
                IMPRESSO_FT => {
                    let path = require_model(IMPRESSO_FT, impresso_ft)?;
                    model_versions.insert(name.clone(), model_id(path));
                    Box::new(FastText::new(path, name, FT_TOP_K, FT_THRESHOLD)?)
                }
                WP_FT => {
                    let path = require_model(WP_FT, wp_ft)?;
                    model_versions.insert(name.clone(), model_id(path));
                    Box::new(FastText::new(path, name, FT_TOP_K, FT_THRESHOLD)?)
                }
                LANGID => {
                    model_versions.insert(name.clone(), "whatlang".to_string());
                    Box::new(Whatlang::new(name))
                }
                LANGDETECT => {
                    model_versions.insert(name.clone(), "whichlang".to_string());
                    Box::new(Whichlang::new(name))
                }
                LINGUA => {
                    model_versions.insert(name.clone(), "lingua".to_string());
                    Box::new(Lingua::new(name))
                }
                IMPRESSO_PIPELINE => {
                    model_versions.insert(name.clone(), "langid+langdetect+lingua".to_string());
                    Box::new(Composite::new(
                        name,
                        vec![
                            Box::new(Whatlang::new(LANGID)),
                            Box::new(Whichlang::new(LANGDETECT)),
                            Box::new(Lingua::new(LINGUA)),
                        ],
                    ))
                }
                unknown => return Err(Error::UnknownLid(unknown.to_string())),
            };

            match lid.languages() {
                Some(langs) => info!("classifier {} covers {} languages", name, langs.len()),
                None => info!("classifier {} has an open language set", name),
            }
            lids.push(lid);
        }

        Ok(Self {
            lids,
            model_versions,
            minimal_text_length,
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.lids.iter().map(|l| l.name()).collect()
    }

    pub fn model_versions(&self) -> &BTreeMap<String, String> {
        &self.model_versions
    }

    /// Run every configured classifier on one item text.
    ///
    /// Every classifier gets a slot in the result: too-short texts
    /// skip prediction entirely, and a backend failing on one item is
    /// recorded and does not abort the run.
    pub fn annotate(&self, text: Option<&str>) -> BTreeMap<String, LidOutput> {
        let usable = text
            .map(|t| t.trim().chars().count() >= self.minimal_text_length)
            .unwrap_or(false);

        self.lids
            .iter()
            .map(|lid| {
                let output = if !usable {
                    LidOutput::Unavailable(SkipReason::TooShort)
                } else {
                    match lid.identify(text.unwrap_or("")) {
                        Ok(Some(preds)) => LidOutput::Ranked(preds),
                        Ok(None) => LidOutput::Unavailable(SkipReason::NoPrediction),
                        Err(e) => {
                            warn!("classifier {} failed: {:?}", lid.name(), e);
                            LidOutput::Unavailable(SkipReason::RuntimeError)
                        }
                    }
                };
                (lid.name().to_string(), output)
            })
            .collect()
    }
}

fn require_model<'a>(name: &str, path: Option<&'a Path>) -> Result<&'a Path, Error> {
    path.ok_or_else(|| Error::Model(format!("no model path configured for {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_name_is_fatal() {
        let err = Registry::new(&names(&["langid", "mystery_lid"]), None, None, 20)
            .err()
            .expect("unknown classifier name must fail");
        match err {
            Error::UnknownLid(name) => assert_eq!(name, "mystery_lid"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_model_path_is_fatal() {
        let err = Registry::new(&names(&["impresso_ft"]), None, None, 20)
            .err()
            .expect("impresso_ft without a model path must fail");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_no_lids_is_fatal() {
        assert!(Registry::new(&[], None, None, 20).is_err());
    }

    #[test]
    fn test_short_text_skips_all() {
        let registry = Registry::new(&names(&["langid", "langdetect"]), None, None, 20).unwrap();
        let slots = registry.annotate(Some("Hier."));
        assert_eq!(slots.len(), 2);
        for output in slots.values() {
            assert_eq!(*output, LidOutput::Unavailable(SkipReason::TooShort));
        }
    }

    #[test]
    fn test_absent_text_skips_all() {
        let registry = Registry::new(&names(&["langdetect"]), None, None, 20).unwrap();
        let slots = registry.annotate(None);
        assert_eq!(
            slots["langdetect"],
            LidOutput::Unavailable(SkipReason::TooShort)
        );
    }

    #[test]
    fn test_every_configured_lid_has_a_slot() {
        let registry =
            Registry::new(&names(&["langid", "langdetect", "lingua"]), None, None, 20).unwrap();
        let slots =
            registry.annotate(Some("Die Schweiz ist ein schönes Land und die Berge sind hoch."));
        assert_eq!(slots.len(), 3);
        assert!(slots.values().any(|o| o.top().is_some()));
    }
}
