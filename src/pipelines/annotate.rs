//! Stage 1a: per-item multi-classifier annotation.
//!
//! Reads one rebuilt `(collection, year)` file, runs every configured
//! classifier on each content item and writes one stage-1 record per
//! input line, in input order. Models are loaded once and reused
//! across items.
use std::path::{Path, PathBuf};

use log::{error, info};

use super::pipeline::Pipeline;
use crate::content::{ContentItem, Stage1Record};
use crate::error::Error;
use crate::features;
use crate::identifiers::Registry;
use crate::io::stamps::{self, Claim};
use crate::io::{JsonLines, JsonlWriter};

pub struct Annotate {
    pub infile: PathBuf,
    pub outfile: PathBuf,
    pub lids: Vec<String>,
    pub impresso_ft: Option<PathBuf>,
    pub wp_ft: Option<PathBuf>,
    pub minimal_text_length: usize,
    pub round_ndigits: i32,
    pub git_describe: String,
    pub max_load: Option<f64>,
}

impl Annotate {
    fn tool_version(&self) -> String {
        if self.git_describe.is_empty() {
            Self::version().to_string()
        } else {
            self.git_describe.clone()
        }
    }

    fn process(&self) -> Result<(), Error> {
        let registry = Registry::new(
            &self.lids,
            self.impresso_ft.as_deref(),
            self.wp_ft.as_deref(),
            self.minimal_text_length,
        )?;
        info!(
            "annotating {:?} with {:?} (minimal text length {})",
            self.infile,
            registry.names(),
            self.minimal_text_length
        );

        let tool_version = self.tool_version();
        let reader = JsonLines::<ContentItem>::open(&self.infile)?;
        let mut writer = JsonlWriter::create(&self.outfile)?;

        for item in reader {
            let item = item?;
            info!("working on {}", item.id);

            let metrics = features::metrics(item.ft.as_deref().unwrap_or(""));
            let predictions = registry
                .annotate(item.ft.as_deref())
                .into_iter()
                .map(|(lid, output)| (lid, output.rounded(self.round_ndigits)))
                .collect();

            let record = Stage1Record {
                id: item.id,
                tp: item.tp,
                ts: item.ts,
                cc: item.cc,
                orig_lg: item.lg,
                len: metrics.length,
                letters: metrics.letters,
                alpha_ratio: features::round_to(metrics.alphabetical_ratio, self.round_ndigits),
                predictions,
                model_versions: registry.model_versions().clone(),
                tool_version: tool_version.clone(),
            };
            writer.write_record(&record)?;
        }

        writer.finish()
    }
}

impl Pipeline<()> for Annotate {
    fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn run(&self) -> Result<(), Error> {
        stamps::wait_for_load(self.max_load);

        run_stamped(&self.outfile, || self.process())
    }
}

/// Claim `output`, run `work`, and resolve the stamp according to the
/// outcome. Writing to stdout needs no coordination.
pub(crate) fn run_stamped<F>(output: &Path, work: F) -> Result<(), Error>
where
    F: FnOnce() -> Result<(), Error>,
{
    if output == Path::new("-") {
        return work();
    }

    let stamp = match stamps::claim(output, stamps::DEFAULT_FRESHNESS)? {
        Claim::AlreadyDone => {
            info!("{:?} already done, skipping", output);
            return Ok(());
        }
        Claim::InProgress => {
            info!("{:?} owned by another worker, skipping", output);
            return Ok(());
        }
        Claim::Acquired(stamp) => stamp,
    };

    match work() {
        Ok(()) => stamp.done(),
        Err(e) => {
            error!("unit {:?} failed: {:?}", output, e);
            stamp.abort();
            Err(e)
        }
    }
}
