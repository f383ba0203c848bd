//! Per-item decision engine (stage 2).
//!
//! Combines the stage-1 predictions of one item with its collection's
//! statistics through an ordered rule cascade, falling back to a
//! weighted vote. The agreement rules look at every classifier that
//! predicted at all; the probability gate only selects the voting
//! electorate, so a hesitant classifier can still break unanimity
//! without getting a vote.
use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::content::{LgDecision, Stage1Record};
use crate::features::round_to;
use crate::identifiers::{IMPRESSO_FT, ORIG_LG};
use crate::lang::IMPRESSO_FT_LANGS;
use crate::stats::CollectionStats;

/// Language code emitted when no rule can produce a language.
pub const UNDETERMINED: &str = "und";

#[derive(Debug, Clone)]
pub struct DecisionConfig {
    pub lids: Vec<String>,
    /// extra voting weight when impresso_ft predicts Luxembourgish
    pub weight_lb_impresso_ft: f64,
    /// probability gate for the voting electorate
    pub minimal_lid_probability: f64,
    pub minimal_voting_score: f64,
    /// below this many characters the dominant language wins outright
    pub minimal_text_length: usize,
    pub boost_factor: f64,
    pub boosted_lids: Vec<String>,
    /// below this ensemble support the provider language is ignored
    pub trust_threshold: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            lids: Vec::new(),
            weight_lb_impresso_ft: 6.0,
            minimal_lid_probability: 0.5,
            minimal_voting_score: 0.5,
            minimal_text_length: 50,
            boost_factor: 1.5,
            boosted_lids: vec![IMPRESSO_FT.to_string(), ORIG_LG.to_string()],
            trust_threshold: 0.75,
        }
    }
}

/// One weighted vote, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteWeight {
    pub lid: String,
    pub lang: String,
    pub weight: f64,
}

/// Per-language totals after boosting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteTotal {
    pub lang: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteDetails {
    pub weights: Vec<VoteWeight>,
    pub totals: Vec<VoteTotal>,
}

/// Outcome of the cascade for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub lg: String,
    pub code: LgDecision,
    pub vote_details: Option<VoteDetails>,
    pub min_text_length_used: Option<usize>,
}

struct Voter<'a> {
    lid: &'a str,
    lang: &'a str,
    prob: f64,
}

pub struct DecisionEngine {
    cfg: DecisionConfig,
    stats: CollectionStats,
}

impl DecisionEngine {
    pub fn new(cfg: DecisionConfig, stats: CollectionStats) -> Self {
        Self { cfg, stats }
    }

    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }

    fn trusts_orig_lg(&self) -> bool {
        self.stats
            .orig_lg_trust
            .map(|trust| trust >= self.cfg.trust_threshold)
            .unwrap_or(false)
    }

    /// Run the cascade for one stage-1 record.
    pub fn decide(&self, record: &Stage1Record) -> Decision {
        let mut members: Vec<Voter> = Vec::new();
        for lid in &self.cfg.lids {
            if let Some(top) = record.top1(lid) {
                members.push(Voter {
                    lid,
                    lang: &top.lang,
                    prob: top.prob,
                });
            }
        }
        // trusted provider metadata joins as one more classifier with
        // the full probability mass
        if self.trusts_orig_lg() {
            if let Some(orig_lg) = &record.orig_lg {
                members.push(Voter {
                    lid: ORIG_LG,
                    lang: orig_lg,
                    prob: 1.0,
                });
            }
        }

        // rule 1: unanimous prediction
        if members.len() >= 2 && all_same(members.iter().map(|m| m.lang)) {
            return Decision {
                lg: members[0].lang.to_string(),
                code: LgDecision::All,
                vote_details: None,
                min_text_length_used: None,
            };
        }

        // rule 2: everyone but impresso_ft agrees on a language the
        // impresso model cannot even express
        let rest: Vec<&Voter> = members.iter().filter(|m| m.lid != IMPRESSO_FT).collect();
        if rest.len() >= 2 && all_same(rest.iter().map(|m| m.lang)) {
            let lang = rest[0].lang;
            if !IMPRESSO_FT_LANGS.contains(lang)
                && self.stats.decided(lang) >= 1
                && record.letters >= self.cfg.minimal_text_length
            {
                return Decision {
                    lg: lang.to_string(),
                    code: LgDecision::AllButImpressoFt,
                    vote_details: None,
                    min_text_length_used: None,
                };
            }
        }

        // rule 3: very short items take the collection's dominant language
        if record.len < self.cfg.minimal_text_length {
            return self.dominant_or_und(
                LgDecision::DominantByLen,
                None,
                Some(self.cfg.minimal_text_length),
            );
        }

        // fallback: weighted vote over the gated electorate
        let (details, best) = self.vote(&members);
        match best {
            Some((lang, score)) if score >= self.cfg.minimal_voting_score => Decision {
                lg: lang,
                code: LgDecision::Voting,
                vote_details: Some(details),
                min_text_length_used: None,
            },
            _ => self.dominant_or_und(LgDecision::DominantByLowvote, Some(details), None),
        }
    }

    /// Weighted votes over members passing the probability gate.
    fn vote(&self, members: &[Voter]) -> (VoteDetails, Option<(String, f64)>) {
        let electorate: Vec<&Voter> = members
            .iter()
            .filter(|m| m.prob >= self.cfg.minimal_lid_probability)
            .collect();

        let mut weights: Vec<VoteWeight> = Vec::with_capacity(electorate.len());
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for (i, voter) in electorate.iter().enumerate() {
            let mut weight = if voter.lid == ORIG_LG {
                2.0 * self.relative_support(voter.lang)
            } else if voter.lid == IMPRESSO_FT && voter.lang == "lb" {
                voter.prob * self.cfg.weight_lb_impresso_ft
            } else {
                voter.prob
            };

            let supported = electorate
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.lang == voter.lang);
            if supported && self.cfg.boosted_lids.iter().any(|b| b == voter.lid) {
                weight *= self.cfg.boost_factor;
            }

            *totals.entry(voter.lang).or_default() += weight;
            weights.push(VoteWeight {
                lid: voter.lid.to_string(),
                lang: voter.lang.to_string(),
                weight: round_to(weight, 3),
            });
        }

        // highest score wins; ties prefer the language with more
        // ensemble decisions, then the lexicographically smaller code
        let best = totals
            .iter()
            .max_by(|a, b| {
                a.1.partial_cmp(b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| self.stats.decided(a.0).cmp(&self.stats.decided(b.0)))
                    .then_with(|| b.0.cmp(a.0))
            })
            .map(|(lang, score)| (lang.to_string(), *score));

        let total_list: Vec<VoteTotal> = totals
            .iter()
            .map(|(lang, score)| VoteTotal {
                lang: lang.to_string(),
                score: round_to(*score, 3),
            })
            .sorted_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.lang.cmp(&b.lang))
            })
            .collect();

        (
            VoteDetails {
                weights,
                totals: total_list,
            },
            best,
        )
    }

    /// Share of the collection's decided items held by `lang`.
    fn relative_support(&self, lang: &str) -> f64 {
        let total: usize = self.stats.per_language_decided.values().sum();
        if total == 0 {
            return 0.0;
        }
        self.stats.decided(lang) as f64 / total as f64
    }

    fn dominant_or_und(
        &self,
        code: LgDecision,
        vote_details: Option<VoteDetails>,
        min_text_length_used: Option<usize>,
    ) -> Decision {
        match &self.stats.dominant_language {
            Some(dominant) => Decision {
                lg: dominant.clone(),
                code,
                vote_details,
                min_text_length_used,
            },
            None => Decision {
                lg: UNDETERMINED.to_string(),
                code: LgDecision::Und,
                vote_details,
                min_text_length_used,
            },
        }
    }
}

fn all_same<'a, I: Iterator<Item = &'a str>>(mut langs: I) -> bool {
    match langs.next() {
        Some(first) => langs.all(|l| l == first),
        None => false,
    }
}
