//! fastText adapter.
//!
//! Serves both the custom impresso model and the Wikipedia LID model;
//! the two differ only in the binary they load.
use std::cmp::Ordering;
use std::path::Path;

use fasttext::{FastText as FastTextLib, Prediction};

use super::{Identifier, LanguageProb};
use crate::error::Error;
use crate::lang::to_iso639_1;

/// Clean the prediction label field from `__label__xx` into `xx`.
fn clean_label(label: &str) -> &str {
    label.strip_prefix("__label__").unwrap_or(label)
}

/// Holds a [fasttext::FastText] instance and its parameters.
/// - [FastText::k], number of predicted languages on a text
/// - [FastText::threshold], prediction threshold
pub struct FastText {
    predictor: FastTextLib,
    name: String,
    pub k: i32,
    pub threshold: f32,
}

impl FastText {
    /// Load a `.bin` fastText model from `filename`.
    ///
    /// # Errors
    /// A model that cannot be loaded is fatal for the whole process.
    pub fn new(filename: &Path, name: &str, k: i32, threshold: f32) -> Result<Self, Error> {
        let mut predictor = FastTextLib::new();
        match filename.to_str() {
            None => Err(Error::Model(format!(
                "invalid model path for {}: {:?}",
                name, filename
            ))),
            Some(filename_str) => {
                predictor
                    .load_model(filename_str)
                    .map_err(|cause| Error::Model(format!("{}: {}", filename_str, cause)))?;
                Ok(Self {
                    predictor,
                    name: name.to_string(),
                    k,
                    threshold,
                })
            }
        }
    }
}

impl Identifier for FastText {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, text: &str) -> Result<Option<Vec<LanguageProb>>, Error> {
        // digits carry no language signal and newlines are document
        // boundaries for the underlying C++ predictor
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_numeric())
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();

        let predictions = self
            .predictor
            .predict(&cleaned, self.k, self.threshold)
            .map_err(Error::Custom)?;

        if predictions.is_empty() {
            return Ok(None);
        }

        let mut result: Vec<LanguageProb> = predictions
            .into_iter()
            .map(|p: Prediction| {
                LanguageProb::new(
                    to_iso639_1(clean_label(&p.label)).to_string(),
                    f64::from(p.prob).min(1.0),
                )
            })
            .collect();
        // the library returns descending probabilities already; keep
        // the guarantee explicit
        result.sort_by(|a, b| b.prob.partial_cmp(&a.prob).unwrap_or(Ordering::Equal));

        Ok(Some(result))
    }
}
