//! Content item records as they travel through the two stages.
//!
//! Content item ids follow the impresso naming scheme,
//! `<collection>-YYYY-MM-DD-x-iNNNN`; collection and year are sliced
//! off the id rather than stored redundantly.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::{LanguageProb, LidOutput};

/// Fixed length of the `-YYYY-MM-DD-x-iNNNN` id suffix.
const ID_SUFFIX_LEN: usize = 19;

/// Collection acronym of a content item id.
pub fn collection_of(id: &str) -> Option<&str> {
    id.get(..id.len().checked_sub(ID_SUFFIX_LEN)?)
        .filter(|c| !c.is_empty())
}

/// Publication year of a content item id, as the literal digits.
pub fn year_of(id: &str) -> Option<&str> {
    let start = id.len().checked_sub(ID_SUFFIX_LEN - 1)?;
    let year = id.get(start..start + 4)?;
    year.bytes().all(|b| b.is_ascii_digit()).then(|| year)
}

/// One line of a rebuilt input file.
///
/// Only `id`, `lg` and `ft` are consumed; `tp`, `ts` and `cc` pass
/// through to the output unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ft: Option<String>,
}

/// Stage-1a output record: one content item annotated by every
/// configured classifier.
///
/// Every configured classifier has a slot; unavailable slots serialize
/// as `null` (see [LidOutput]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage1Record {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_lg: Option<String>,
    pub len: usize,
    pub letters: usize,
    pub alpha_ratio: f64,
    pub predictions: BTreeMap<String, LidOutput>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub model_versions: BTreeMap<String, String>,
    pub tool_version: String,
}

impl Stage1Record {
    pub fn collection(&self) -> Option<&str> {
        collection_of(&self.id)
    }

    pub fn year(&self) -> Option<&str> {
        year_of(&self.id)
    }

    /// Top-1 prediction of one classifier, if it produced any.
    pub fn top1(&self, lid: &str) -> Option<&LanguageProb> {
        self.predictions.get(lid)?.top()
    }
}

/// Decision code of the stage-2 rule cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LgDecision {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "all-but-impresso_ft")]
    AllButImpressoFt,
    #[serde(rename = "dominant-by-len")]
    DominantByLen,
    #[serde(rename = "dominant-by-lowvote")]
    DominantByLowvote,
    #[serde(rename = "voting")]
    Voting,
    #[serde(rename = "und")]
    Und,
}

impl LgDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            LgDecision::All => "all",
            LgDecision::AllButImpressoFt => "all-but-impresso_ft",
            LgDecision::DominantByLen => "dominant-by-len",
            LgDecision::DominantByLowvote => "dominant-by-lowvote",
            LgDecision::Voting => "voting",
            LgDecision::Und => "und",
        }
    }
}

/// Stage-2 output record: the final language decision for one item.
///
/// `lg` is `null` only for items that carry no decidable text at all
/// (image items); every other item gets a language, possibly `und`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage2Record {
    pub id: String,
    pub lg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg_decision: Option<LgDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_lg: Option<String>,
    pub len: usize,
    pub alpha_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub tool_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_text_length_used: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_details: Option<crate::decision::VoteDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_slicing() {
        let id = "luxzeit1858-1859-01-06-a-i0005";
        assert_eq!(collection_of(id), Some("luxzeit1858"));
        assert_eq!(year_of(id), Some("1859"));
    }

    #[test]
    fn test_id_too_short() {
        assert_eq!(collection_of("x-1859-01-06-a-i0005"), Some("x"));
        assert_eq!(collection_of("-1859-01-06-a-i0005"), None);
        assert_eq!(collection_of("short"), None);
        assert_eq!(year_of("short"), None);
    }

    #[test]
    fn test_year_must_be_digits() {
        assert_eq!(year_of("gazette-year-01-06-a-i0005"), None);
    }

    #[test]
    fn test_content_item_parses_rebuilt_line() {
        let line = r#"{"id":"gazette-1901-02-03-a-i0001","tp":"ar","ts":"2020-01-01","lg":"fr","ft":"Bonjour.","cc":true}"#;
        let item: ContentItem = serde_json::from_str(line).unwrap();
        assert_eq!(item.id, "gazette-1901-02-03-a-i0001");
        assert_eq!(item.lg.as_deref(), Some("fr"));
        assert_eq!(item.ft.as_deref(), Some("Bonjour."));
        assert!(item.cc.is_some());
    }

    #[test]
    fn test_stage1_roundtrip_keeps_null_slots() {
        let json = r#"{"id":"gazette-1901-02-03-a-i0001","orig_lg":"fr","len":8,"letters":7,
            "alpha_ratio":0.875,
            "predictions":{"langid":[{"lang":"fr","prob":0.99}],"wp_ft":null},
            "tool_version":"0.1.0"}"#;
        let rec: Stage1Record = serde_json::from_str(json).unwrap();
        assert_eq!(rec.top1("langid").unwrap().lang, "fr");
        assert!(rec.top1("wp_ft").is_none());
        let out = serde_json::to_string(&rec).unwrap();
        assert!(out.contains(r#""wp_ft":null"#));
    }

    #[test]
    fn test_decision_code_names() {
        assert_eq!(
            serde_json::to_string(&LgDecision::AllButImpressoFt).unwrap(),
            r#""all-but-impresso_ft""#
        );
        assert_eq!(LgDecision::DominantByLowvote.as_str(), "dominant-by-lowvote");
    }
}
