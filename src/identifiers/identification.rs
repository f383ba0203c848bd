//! Uniform classifier output shape.
//!
//! Every backend, whatever its native scoring, is normalized into a
//! ranked list of [LanguageProb] pairs, best first. A slot without a
//! usable prediction keeps the reason in memory and serializes as
//! `null`, which is all the exchange format records.
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::features::round_to;

/// One language/probability pair of a classifier prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProb {
    pub lang: String,
    pub prob: f64,
}

impl LanguageProb {
    pub fn new<S: Into<String>>(lang: S, prob: f64) -> Self {
        Self {
            lang: lang.into(),
            prob,
        }
    }
}

/// Why a classifier slot holds no prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// text below the stage-1a length threshold
    TooShort,
    /// backend ran but refused to commit to a language
    NoPrediction,
    /// backend failed on this item
    RuntimeError,
    /// read back from a file, where reasons are not recorded
    Unrecorded,
}

/// Outcome of one classifier on one content item.
#[derive(Debug, Clone, PartialEq)]
pub enum LidOutput {
    /// ranked predictions, descending probability, length ≥ 1
    Ranked(Vec<LanguageProb>),
    Unavailable(SkipReason),
}

impl LidOutput {
    /// Top-ranked pair, if any.
    pub fn top(&self) -> Option<&LanguageProb> {
        match self {
            LidOutput::Ranked(preds) => preds.first(),
            LidOutput::Unavailable(_) => None,
        }
    }

    /// Round probabilities for output.
    pub fn rounded(self, ndigits: i32) -> Self {
        match self {
            LidOutput::Ranked(preds) => LidOutput::Ranked(
                preds
                    .into_iter()
                    .map(|p| LanguageProb::new(p.lang, round_to(p.prob, ndigits)))
                    .collect(),
            ),
            unavailable => unavailable,
        }
    }
}

impl Serialize for LidOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LidOutput::Ranked(preds) => preds.serialize(serializer),
            LidOutput::Unavailable(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for LidOutput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let preds = Option::<Vec<LanguageProb>>::deserialize(deserializer)?;
        Ok(match preds {
            Some(preds) if !preds.is_empty() => LidOutput::Ranked(preds),
            _ => LidOutput::Unavailable(SkipReason::Unrecorded),
        })
    }
}
