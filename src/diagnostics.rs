//! Per-year diagnostics of the stage-2 output.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content::Stage2Record;

/// Sidecar counters for one stage-2 output file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// items per `<collection>-<year>`
    #[serde(rename = "N")]
    pub n: BTreeMap<String, usize>,
    /// items per final language (`null` for undecidable image items)
    pub lg: BTreeMap<String, usize>,
    pub decision_codes: BTreeMap<String, usize>,
    pub model_versions: BTreeMap<String, String>,
    pub tool_version: String,
    pub git_describe: String,
}

impl Diagnostics {
    pub fn new(
        model_versions: BTreeMap<String, String>,
        tool_version: String,
        git_describe: String,
    ) -> Self {
        Self {
            model_versions,
            tool_version,
            git_describe,
            ..Self::default()
        }
    }

    /// Count one emitted record.
    pub fn count(&mut self, record: &Stage2Record) {
        let unit = format!(
            "{}-{}",
            record.collection.as_deref().unwrap_or("unknown"),
            record.year.as_deref().unwrap_or("0000"),
        );
        *self.n.entry(unit).or_default() += 1;

        let lg = record.lg.clone().unwrap_or_else(|| "null".to_string());
        *self.lg.entry(lg).or_default() += 1;

        if let Some(decision) = record.lg_decision {
            *self.decision_codes.entry(decision.as_str().to_string()).or_default() += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::LgDecision;

    fn record(lg: Option<&str>, decision: Option<LgDecision>) -> Stage2Record {
        Stage2Record {
            id: "gazette-1900-01-01-a-i0001".to_string(),
            lg: lg.map(|s| s.to_string()),
            lg_decision: decision,
            tp: None,
            ts: None,
            cc: None,
            orig_lg: None,
            len: 100,
            alpha_ratio: 0.8,
            collection: Some("gazette".to_string()),
            year: Some("1900".to_string()),
            tool_version: "test".to_string(),
            min_text_length_used: None,
            vote_details: None,
        }
    }

    #[test]
    fn test_counts_by_unit_language_and_code() {
        let mut diag = Diagnostics::default();
        diag.count(&record(Some("de"), Some(LgDecision::All)));
        diag.count(&record(Some("de"), Some(LgDecision::Voting)));
        diag.count(&record(Some("fr"), Some(LgDecision::All)));
        diag.count(&record(None, None));

        assert_eq!(diag.n["gazette-1900"], 4);
        assert_eq!(diag.lg["de"], 2);
        assert_eq!(diag.lg["null"], 1);
        assert_eq!(diag.decision_codes["all"], 2);
        assert_eq!(diag.decision_codes.get("und"), None);
    }
}
