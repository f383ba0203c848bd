//! Collection-level ensemble statistics (stage 1b).
//!
//! Streams the stage-1 records of one collection and tallies, per
//! admitted item, an ensemble vote over all classifier predictions and
//! the provider language. The resulting [CollectionStats] measure how
//! much each classifier, and the provider metadata, can be trusted on
//! this collection.
use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::content::Stage1Record;
use crate::features::round_to;
use crate::identifiers::{IMPRESSO_FT, ORIG_LG};

/// Agreement of one classifier with the ensemble decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgreementCounts {
    /// decided items where the classifier's top-1 matched
    pub agreed: usize,
    /// decided items where the classifier predicted at all
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

/// Ensemble backing for the provider language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportCounts {
    pub positive: usize,
    pub negative: usize,
}

/// Statistics of one newspaper collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub collection: String,
    pub lids: Vec<String>,
    pub boosted_lids: Vec<String>,
    /// items admitted by the length/alphabeticity filter
    pub items_total: usize,
    pub items_decided: usize,
    pub items_tied: usize,
    /// malformed stage-1 lines skipped while reading
    pub records_skipped: usize,
    /// per-language vote mass, boosts included
    pub vote_totals: BTreeMap<String, f64>,
    /// per-language ensemble decision counts
    pub per_language_decided: BTreeMap<String, usize>,
    pub dominant_language: Option<String>,
    pub orig_lg_support: SupportCounts,
    /// positives / (positives + negatives), undefined without support data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_lg_trust: Option<f64>,
    pub lid_agreement: BTreeMap<String, AgreementCounts>,
    pub minimal_text_length: usize,
    pub minimal_alphabetical_ratio: f64,
    pub boost_factor: f64,
    pub minimal_vote_score: f64,
    pub minimal_lid_probability: f64,
    pub tool_version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub model_versions: BTreeMap<String, String>,
}

impl CollectionStats {
    pub fn decided(&self, lang: &str) -> usize {
        self.per_language_decided.get(lang).copied().unwrap_or(0)
    }
}

/// Configuration of the vote construction.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub lids: Vec<String>,
    pub boosted_lids: Vec<String>,
    /// letters threshold of the admission filter
    pub minimal_text_length: usize,
    pub minimal_alphabetical_ratio: f64,
    pub boost_factor: f64,
    pub minimal_vote_score: f64,
    pub minimal_lid_probability: f64,
    pub round_ndigits: i32,
    pub tool_version: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            lids: Vec::new(),
            boosted_lids: vec![IMPRESSO_FT.to_string(), ORIG_LG.to_string()],
            minimal_text_length: 200,
            minimal_alphabetical_ratio: 0.5,
            boost_factor: 1.5,
            minimal_vote_score: 1.5,
            minimal_lid_probability: 0.2,
            round_ndigits: 9,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Per-item ensemble outcome.
#[derive(Debug, PartialEq)]
enum ItemDecision {
    Decided(String),
    Tied,
    /// best score below the vote threshold
    BelowThreshold,
}

pub struct Aggregator {
    cfg: AggregatorConfig,
    collection: Option<String>,
    items_total: usize,
    items_decided: usize,
    items_tied: usize,
    records_skipped: usize,
    vote_totals: BTreeMap<String, f64>,
    per_language_decided: BTreeMap<String, usize>,
    orig_lg_support: SupportCounts,
    lid_agreement: BTreeMap<String, AgreementCounts>,
    model_versions: BTreeMap<String, String>,
}

impl Aggregator {
    pub fn new(collection: Option<String>, cfg: AggregatorConfig) -> Self {
        let lid_agreement = cfg
            .lids
            .iter()
            .map(|lid| (lid.clone(), AgreementCounts::default()))
            .collect();
        Self {
            cfg,
            collection,
            items_total: 0,
            items_decided: 0,
            items_tied: 0,
            records_skipped: 0,
            vote_totals: BTreeMap::new(),
            per_language_decided: BTreeMap::new(),
            orig_lg_support: SupportCounts::default(),
            lid_agreement,
            model_versions: BTreeMap::new(),
        }
    }

    pub fn record_skipped(&mut self) {
        self.records_skipped += 1;
    }

    /// Feed one stage-1 record into the tallies.
    pub fn add(&mut self, record: &Stage1Record) {
        if self.collection.is_none() {
            // the id suffix is fixed, the collection prefix is not
            self.collection = record.collection().map(|c| c.to_string());
            if let Some(collection) = &self.collection {
                warn!("inferred collection name '{}' from first item", collection);
            }
        }
        if self.model_versions.is_empty() {
            self.model_versions = record.model_versions.clone();
        }

        // image items carry no identifiable text
        if record.tp.as_deref() == Some("img") {
            return;
        }

        // admission filter: enough letters, mostly alphabetic
        if record.letters < self.cfg.minimal_text_length
            || record.alpha_ratio < self.cfg.minimal_alphabetical_ratio
        {
            debug!("item {} below statistics admission thresholds", record.id);
            return;
        }

        self.items_total += 1;

        let votes = self.votes(record);
        for (lang, score) in &votes {
            *self.vote_totals.entry(lang.clone()).or_default() += score;
        }

        let decision = decide_votes(&votes, self.cfg.minimal_vote_score);
        let decided_lang = match decision {
            ItemDecision::Decided(lang) => {
                self.items_decided += 1;
                *self.per_language_decided.entry(lang.clone()).or_default() += 1;
                Some(lang)
            }
            ItemDecision::Tied => {
                debug!("item {}: tie between top languages, no decision", record.id);
                self.items_tied += 1;
                None
            }
            ItemDecision::BelowThreshold => None,
        };

        // agreement and provider support only count against actual decisions
        if let Some(lang) = decided_lang {
            for lid in &self.cfg.lids {
                if let Some(top) = record.top1(lid) {
                    let counts = self.lid_agreement.entry(lid.clone()).or_default();
                    counts.total += 1;
                    if top.lang == lang {
                        counts.agreed += 1;
                    }
                }
            }
            if let Some(orig_lg) = &record.orig_lg {
                if *orig_lg == lang {
                    self.orig_lg_support.positive += 1;
                } else {
                    self.orig_lg_support.negative += 1;
                }
            }
        }
    }

    /// Base votes plus support boost for one admitted record.
    ///
    /// Every qualifying classifier and the provider language cast one
    /// vote for their language; a boosted voter whose language has at
    /// least one other voter gets its own vote multiplied by the boost
    /// factor.
    fn votes(&self, record: &Stage1Record) -> BTreeMap<String, f64> {
        let mut voters: Vec<(&str, &str)> = Vec::new();
        for lid in &self.cfg.lids {
            if let Some(top) = record.top1(lid) {
                if top.prob >= self.cfg.minimal_lid_probability {
                    voters.push((lid.as_str(), top.lang.as_str()));
                }
            }
        }
        if let Some(orig_lg) = &record.orig_lg {
            voters.push((ORIG_LG, orig_lg.as_str()));
        }

        let mut scores: BTreeMap<String, f64> = BTreeMap::new();
        for (i, (name, lang)) in voters.iter().enumerate() {
            // a voter never supports itself
            let supported = voters
                .iter()
                .enumerate()
                .any(|(j, (_, other_lang))| j != i && other_lang == lang);
            let boosted = self.cfg.boosted_lids.iter().any(|b| b == name);
            let weight = if supported && boosted {
                self.cfg.boost_factor
            } else {
                1.0
            };
            *scores.entry(lang.to_string()).or_default() += weight;
        }
        scores
    }

    /// Close the tallies into a [CollectionStats].
    pub fn finish(self) -> CollectionStats {
        let dominant_language = dominant(&self.per_language_decided);

        let orig_lg_trust = {
            let positives = self.orig_lg_support.positive;
            let total = positives + self.orig_lg_support.negative;
            if total > 0 {
                Some(round_to(
                    positives as f64 / total as f64,
                    self.cfg.round_ndigits,
                ))
            } else {
                None
            }
        };

        let lid_agreement = self
            .lid_agreement
            .into_iter()
            .map(|(lid, mut counts)| {
                if counts.total > 0 {
                    counts.rate = Some(round_to(
                        counts.agreed as f64 / counts.total as f64,
                        self.cfg.round_ndigits,
                    ));
                }
                (lid, counts)
            })
            .collect();

        let vote_totals = self
            .vote_totals
            .into_iter()
            .map(|(lang, score)| (lang, round_to(score, self.cfg.round_ndigits)))
            .collect();

        CollectionStats {
            collection: self.collection.unwrap_or_default(),
            lids: self.cfg.lids,
            boosted_lids: self.cfg.boosted_lids,
            items_total: self.items_total,
            items_decided: self.items_decided,
            items_tied: self.items_tied,
            records_skipped: self.records_skipped,
            vote_totals,
            per_language_decided: self.per_language_decided,
            dominant_language,
            orig_lg_support: self.orig_lg_support,
            orig_lg_trust,
            lid_agreement,
            minimal_text_length: self.cfg.minimal_text_length,
            minimal_alphabetical_ratio: self.cfg.minimal_alphabetical_ratio,
            boost_factor: self.cfg.boost_factor,
            minimal_vote_score: self.cfg.minimal_vote_score,
            minimal_lid_probability: self.cfg.minimal_lid_probability,
            tool_version: self.cfg.tool_version,
            model_versions: self.model_versions,
        }
    }
}

/// Unique best-scoring language, if the score clears the threshold.
fn decide_votes(votes: &BTreeMap<String, f64>, minimal_vote_score: f64) -> ItemDecision {
    let best = votes
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
    let (lang, score) = match best {
        Some((lang, score)) => (lang, *score),
        None => return ItemDecision::BelowThreshold,
    };
    if score < minimal_vote_score {
        return ItemDecision::BelowThreshold;
    }

    let contenders = votes
        .values()
        .filter(|s| (**s - score).abs() < f64::EPSILON)
        .count();
    if contenders > 1 {
        ItemDecision::Tied
    } else {
        ItemDecision::Decided(lang.clone())
    }
}

/// Most frequent decided language; ties break lexicographically.
fn dominant(per_language_decided: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (lang, count) in per_language_decided {
        match best {
            // strictly greater, so the first (smallest) key wins ties
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((lang, *count)),
        }
    }
    best.map(|(lang, _)| lang.clone())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::identifiers::{LanguageProb, LidOutput};

    fn record(
        id: &str,
        orig_lg: Option<&str>,
        letters: usize,
        preds: &[(&str, &str, f64)],
    ) -> Stage1Record {
        let mut predictions = BTreeMap::new();
        for (lid, lang, prob) in preds {
            predictions.insert(
                lid.to_string(),
                LidOutput::Ranked(vec![LanguageProb::new(*lang, *prob)]),
            );
        }
        Stage1Record {
            id: id.to_string(),
            tp: Some("ar".to_string()),
            ts: None,
            cc: None,
            orig_lg: orig_lg.map(|s| s.to_string()),
            len: letters + letters / 4,
            letters,
            alpha_ratio: 0.8,
            predictions,
            model_versions: BTreeMap::new(),
            tool_version: "test".to_string(),
        }
    }

    fn config(lids: &[&str]) -> AggregatorConfig {
        AggregatorConfig {
            lids: lids.iter().map(|s| s.to_string()).collect(),
            ..AggregatorConfig::default()
        }
    }

    #[test]
    fn test_boost_needs_support_from_another_voter() {
        let agg = Aggregator::new(None, config(&["langid", "impresso_ft"]));

        // impresso_ft alone on de: no boost
        let r = record(
            "gazette-1900-01-01-a-i0001",
            None,
            300,
            &[("impresso_ft", "de", 0.9), ("langid", "fr", 0.9)],
        );
        let votes = agg.votes(&r);
        assert_eq!(votes["de"], 1.0);
        assert_eq!(votes["fr"], 1.0);

        // langid agrees: impresso_ft's own vote is multiplied
        let r = record(
            "gazette-1900-01-01-a-i0002",
            None,
            300,
            &[("impresso_ft", "de", 0.9), ("langid", "de", 0.9)],
        );
        let votes = agg.votes(&r);
        assert_eq!(votes["de"], 2.5);
    }

    #[test]
    fn test_orig_lg_votes_and_boosts() {
        let agg = Aggregator::new(None, config(&["langid"]));

        // orig_lg supported by langid: 1.5 + 1.0
        let r = record(
            "gazette-1900-01-01-a-i0001",
            Some("de"),
            300,
            &[("langid", "de", 0.9)],
        );
        assert_eq!(agg.votes(&r)["de"], 2.5);

        // unsupported orig_lg stays at weight 1
        let r = record(
            "gazette-1900-01-01-a-i0002",
            Some("it"),
            300,
            &[("langid", "de", 0.9)],
        );
        let votes = agg.votes(&r);
        assert_eq!(votes["it"], 1.0);
        assert_eq!(votes["de"], 1.0);
    }

    #[test]
    fn test_two_boosted_voters_support_each_other() {
        let agg = Aggregator::new(None, config(&["impresso_ft"]));
        let r = record(
            "gazette-1900-01-01-a-i0001",
            Some("de"),
            300,
            &[("impresso_ft", "de", 0.9)],
        );
        // both boosted voters get the factor, each supported by the other
        assert_eq!(agg.votes(&r)["de"], 3.0);
    }

    #[test]
    fn test_low_probability_prediction_casts_no_vote() {
        let agg = Aggregator::new(None, config(&["langid", "langdetect"]));
        let r = record(
            "gazette-1900-01-01-a-i0001",
            None,
            300,
            &[("langid", "de", 0.1), ("langdetect", "de", 0.9)],
        );
        assert_eq!(agg.votes(&r)["de"], 1.0);
    }

    #[test]
    fn test_tie_yields_no_decision() {
        let mut votes = BTreeMap::new();
        votes.insert("de".to_string(), 2.0);
        votes.insert("fr".to_string(), 2.0);
        assert_eq!(decide_votes(&votes, 1.5), ItemDecision::Tied);
    }

    #[test]
    fn test_below_threshold_yields_no_decision() {
        let mut votes = BTreeMap::new();
        votes.insert("de".to_string(), 1.0);
        assert_eq!(decide_votes(&votes, 1.5), ItemDecision::BelowThreshold);
    }

    #[test]
    fn test_admission_filter() {
        let mut agg = Aggregator::new(None, config(&["langid", "langdetect"]));

        // too few letters
        let r = record(
            "gazette-1900-01-01-a-i0001",
            Some("de"),
            100,
            &[("langid", "de", 0.9), ("langdetect", "de", 0.9)],
        );
        agg.add(&r);
        assert_eq!(agg.items_total, 0);

        // low alphabetical ratio
        let mut r = record(
            "gazette-1900-01-01-a-i0002",
            Some("de"),
            300,
            &[("langid", "de", 0.9), ("langdetect", "de", 0.9)],
        );
        r.alpha_ratio = 0.3;
        agg.add(&r);
        assert_eq!(agg.items_total, 0);

        // admitted and decided
        let r = record(
            "gazette-1900-01-01-a-i0003",
            Some("de"),
            300,
            &[("langid", "de", 0.9), ("langdetect", "de", 0.9)],
        );
        agg.add(&r);
        assert_eq!(agg.items_total, 1);
        assert_eq!(agg.items_decided, 1);
    }

    #[test]
    fn test_trust_and_agreement() {
        let mut agg = Aggregator::new(None, config(&["langid", "langdetect"]));
        // three decided items backing de, orig_lg wrong once
        for (i, orig) in [("i0001", "de"), ("i0002", "de"), ("i0003", "fr")] {
            let r = record(
                &format!("gazette-1900-01-01-a-{}", i),
                Some(orig),
                300,
                &[("langid", "de", 0.9), ("langdetect", "de", 0.9)],
            );
            agg.add(&r);
        }

        let stats = agg.finish();
        assert_eq!(stats.collection, "gazette");
        assert_eq!(stats.items_decided, 3);
        assert_eq!(stats.orig_lg_support.positive, 2);
        assert_eq!(stats.orig_lg_support.negative, 1);
        assert!((stats.orig_lg_trust.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.lid_agreement["langid"].agreed, 3);
        assert_eq!(stats.lid_agreement["langid"].rate, Some(1.0));
        assert_eq!(stats.dominant_language.as_deref(), Some("de"));
    }

    #[test]
    fn test_trust_undefined_without_orig_lg() {
        let mut agg = Aggregator::new(None, config(&["langid", "langdetect"]));
        let r = record(
            "gazette-1900-01-01-a-i0001",
            None,
            300,
            &[("langid", "de", 0.9), ("langdetect", "de", 0.9)],
        );
        agg.add(&r);
        let stats = agg.finish();
        assert_eq!(stats.orig_lg_trust, None);
    }

    #[test]
    fn test_dominant_tie_breaks_lexicographically() {
        let mut decided = BTreeMap::new();
        decided.insert("fr".to_string(), 5);
        decided.insert("de".to_string(), 5);
        decided.insert("it".to_string(), 2);
        assert_eq!(dominant(&decided).as_deref(), Some("de"));
    }

    #[test]
    fn test_img_items_do_not_contribute() {
        let mut agg = Aggregator::new(None, config(&["langid"]));
        let mut r = record(
            "gazette-1900-01-01-a-i0001",
            Some("de"),
            300,
            &[("langid", "de", 0.9)],
        );
        r.tp = Some("img".to_string());
        agg.add(&r);
        assert_eq!(agg.items_total, 0);
    }

    #[test]
    fn test_vote_totals_are_recomputable() {
        // determinism: feeding the same records twice doubles every tally
        let mk = |agg: &mut Aggregator| {
            for i in 1..=2 {
                let r = record(
                    &format!("gazette-1900-01-01-a-i000{}", i),
                    Some("de"),
                    300,
                    &[("langid", "de", 0.9), ("langdetect", "fr", 0.9)],
                );
                agg.add(&r);
            }
        };
        let mut once = Aggregator::new(None, config(&["langid", "langdetect"]));
        mk(&mut once);
        let once = once.finish();

        let mut twice = Aggregator::new(None, config(&["langid", "langdetect"]));
        mk(&mut twice);
        mk(&mut twice);
        let twice = twice.finish();

        for (lang, score) in &once.vote_totals {
            assert!((twice.vote_totals[lang] - 2.0 * score).abs() < 1e-9);
        }
    }
}
