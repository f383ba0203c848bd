//! Composite backend (`impresso_langident_pipeline`).
//!
//! Bundles several member backends behind one classifier name and
//! averages their distributions, so downstream stages see a single
//! prediction with smoothed-out member quirks.
use std::collections::BTreeMap;

use log::debug;

use super::{Identifier, LanguageProb};
use crate::error::Error;

pub struct Composite {
    name: String,
    members: Vec<Box<dyn Identifier>>,
}

impl Composite {
    pub fn new(name: &str, members: Vec<Box<dyn Identifier>>) -> Self {
        Self {
            name: name.to_string(),
            members,
        }
    }

    /// Average the members' probability mass per language.
    ///
    /// Each member that produced a prediction contributes one row; the
    /// per-language sums are divided by the number of rows. Ties sort
    /// lexicographically so the output is reproducible.
    fn average(rows: Vec<Vec<LanguageProb>>) -> Vec<LanguageProb> {
        let total = rows.len() as f64;
        let mut mass: BTreeMap<String, f64> = BTreeMap::new();
        for row in rows {
            for pred in row {
                *mass.entry(pred.lang).or_default() += pred.prob;
            }
        }

        let mut averaged: Vec<LanguageProb> = mass
            .into_iter()
            .map(|(lang, prob)| LanguageProb::new(lang, prob / total))
            .collect();
        averaged.sort_by(|a, b| {
            b.prob
                .partial_cmp(&a.prob)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.lang.cmp(&b.lang))
        });
        averaged
    }
}

impl Identifier for Composite {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, text: &str) -> Result<Option<Vec<LanguageProb>>, Error> {
        let mut rows = Vec::with_capacity(self.members.len());
        for member in &self.members {
            match member.identify(text) {
                Ok(Some(preds)) => rows.push(preds),
                Ok(None) => {}
                Err(e) => debug!("{}: member {} failed: {:?}", self.name, member.name(), e),
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::average(rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Vec<LanguageProb>);

    impl Identifier for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn identify(&self, _text: &str) -> Result<Option<Vec<LanguageProb>>, Error> {
            if self.1.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.1.clone()))
            }
        }
    }

    #[test]
    fn test_average_two_members() {
        let composite = Composite::new(
            "impresso_langident_pipeline",
            vec![
                Box::new(Fixed("a", vec![LanguageProb::new("de", 1.0)])),
                Box::new(Fixed(
                    "b",
                    vec![LanguageProb::new("de", 0.5), LanguageProb::new("fr", 0.5)],
                )),
            ],
        );
        let preds = composite.identify("whatever").unwrap().unwrap();
        assert_eq!(preds[0], LanguageProb::new("de", 0.75));
        assert_eq!(preds[1], LanguageProb::new("fr", 0.25));
    }

    #[test]
    fn test_refusing_member_shrinks_denominator() {
        let composite = Composite::new(
            "impresso_langident_pipeline",
            vec![
                Box::new(Fixed("a", vec![LanguageProb::new("it", 0.8)])),
                Box::new(Fixed("b", vec![])),
            ],
        );
        let preds = composite.identify("whatever").unwrap().unwrap();
        assert_eq!(preds, vec![LanguageProb::new("it", 0.8)]);
    }

    #[test]
    fn test_all_members_refuse() {
        let composite =
            Composite::new("impresso_langident_pipeline", vec![Box::new(Fixed("a", vec![]))]);
        assert!(composite.identify("whatever").unwrap().is_none());
    }

    #[test]
    fn test_tied_languages_sort_lexicographically() {
        let composite = Composite::new(
            "impresso_langident_pipeline",
            vec![Box::new(Fixed(
                "a",
                vec![LanguageProb::new("fr", 0.5), LanguageProb::new("de", 0.5)],
            ))],
        );
        let preds = composite.identify("whatever").unwrap().unwrap();
        assert_eq!(preds[0].lang, "de");
    }
}
