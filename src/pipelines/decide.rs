//! Stage 2: final language decision per content item.
//!
//! Reads one stage-1 file and the collection statistics, runs every
//! record through the [DecisionEngine] and writes the decided records
//! in input order, plus a diagnostics sidecar. Every input id appears
//! in the output.
use std::path::PathBuf;

use log::info;

use super::annotate::run_stamped;
use super::pipeline::Pipeline;
use crate::content::{collection_of, year_of, Stage1Record, Stage2Record};
use crate::decision::{DecisionConfig, DecisionEngine};
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::io::reader::open_input;
use crate::io::stamps;
use crate::io::{write_json_atomic, JsonLines, JsonlWriter};
use crate::stats::CollectionStats;

pub struct Decide {
    pub infile: PathBuf,
    pub outfile: PathBuf,
    pub collection_stats_filename: PathBuf,
    pub diagnostics_json: Option<PathBuf>,
    pub cfg: DecisionConfig,
    pub git_describe: String,
    pub max_load: Option<f64>,
}

impl Pipeline<()> for Decide {
    fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn run(&self) -> Result<(), Error> {
        stamps::wait_for_load(self.max_load);

        run_stamped(&self.outfile, || self.process())
    }
}

impl Decide {
    fn tool_version(&self) -> String {
        if self.git_describe.is_empty() {
            Self::version().to_string()
        } else {
            self.git_describe.clone()
        }
    }

    /// Load the collection statistics; absence is fatal for the unit.
    fn load_stats(&self) -> Result<CollectionStats, Error> {
        let path = &self.collection_stats_filename;
        let reader = open_input(path)
            .map_err(|e| Error::Stats(path.clone(), format!("{:?}", e)))?;
        serde_json::from_reader(reader).map_err(|e| Error::Stats(path.clone(), e.to_string()))
    }

    fn process(&self) -> Result<(), Error> {
        let stats = self.load_stats()?;
        info!(
            "deciding {:?} against collection '{}' (dominant {:?}, orig_lg trust {:?})",
            self.infile, stats.collection, stats.dominant_language, stats.orig_lg_trust
        );

        let tool_version = self.tool_version();
        let model_versions = stats.model_versions.clone();
        let engine = DecisionEngine::new(self.cfg.clone(), stats);

        let mut diagnostics = Diagnostics::new(
            model_versions,
            tool_version.clone(),
            self.git_describe.clone(),
        );

        let reader = JsonLines::<Stage1Record>::open(&self.infile)?;
        let mut writer = JsonlWriter::create(&self.outfile)?;

        for record in reader {
            let record = record?;
            let output = self.decide_one(&engine, record, &tool_version);
            diagnostics.count(&output);
            writer.write_record(&output)?;
        }
        writer.finish()?;

        if let Some(diagnostics_json) = &self.diagnostics_json {
            write_json_atomic(diagnostics_json, &diagnostics)?;
        }
        Ok(())
    }

    fn decide_one(
        &self,
        engine: &DecisionEngine,
        record: Stage1Record,
        tool_version: &str,
    ) -> Stage2Record {
        let collection = collection_of(&record.id).map(|c| c.to_string());
        let year = year_of(&record.id).map(|y| y.to_string());

        // image items carry no text to decide on
        let decision = if record.tp.as_deref() == Some("img") {
            None
        } else {
            Some(engine.decide(&record))
        };

        let (lg, lg_decision, vote_details, min_text_length_used) = match decision {
            Some(decision) => (
                Some(decision.lg),
                Some(decision.code),
                decision.vote_details,
                decision.min_text_length_used,
            ),
            None => (None, None, None, None),
        };

        Stage2Record {
            id: record.id,
            lg,
            lg_decision,
            tp: record.tp,
            ts: record.ts,
            cc: record.cc,
            orig_lg: record.orig_lg,
            len: record.len,
            alpha_ratio: record.alpha_ratio,
            collection,
            year,
            tool_version: tool_version.to_string(),
            min_text_length_used,
            vote_details,
        }
    }
}
