//! Stage 1b: collection-level ensemble statistics.
//!
//! Streams every stage-1 file of one collection into the
//! [Aggregator] and writes the resulting statistics JSON. Sequential
//! and cheap; a missing input file is fatal, a malformed record is
//! skipped and counted.
use std::path::PathBuf;

use log::{info, warn};

use super::annotate::run_stamped;
use super::pipeline::Pipeline;
use crate::content::Stage1Record;
use crate::error::Error;
use crate::io::{write_json_atomic, JsonLines};
use crate::stats::{Aggregator, AggregatorConfig};

pub struct Aggregate {
    pub collection: Option<String>,
    pub infiles: Vec<PathBuf>,
    pub outfile: PathBuf,
    pub cfg: AggregatorConfig,
}

impl Pipeline<()> for Aggregate {
    fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn run(&self) -> Result<(), Error> {
        run_stamped(&self.outfile, || self.process())
    }
}

impl Aggregate {
    fn process(&self) -> Result<(), Error> {
        info!(
            "aggregating {} stage-1 file(s) with lids {:?}, boosted {:?}",
            self.infiles.len(),
            self.cfg.lids,
            self.cfg.boosted_lids
        );

        let mut aggregator = Aggregator::new(self.collection.clone(), self.cfg.clone());

        for path in &self.infiles {
            info!("reading {:?}", path);
            let reader = JsonLines::<Stage1Record>::open(path)?;
            for record in reader {
                match record {
                    Ok(record) => aggregator.add(&record),
                    Err(e) => {
                        warn!("skipping malformed record in {:?}: {:?}", path, e);
                        aggregator.record_skipped();
                    }
                }
            }
        }

        let stats = aggregator.finish();
        if stats.collection.is_empty() {
            warn!("no content items seen, collection name unknown");
        }
        info!(
            "collection '{}': {} items, {} decided, {} tied, dominant {:?}",
            stats.collection,
            stats.items_total,
            stats.items_decided,
            stats.items_tied,
            stats.dominant_language
        );

        write_json_atomic(&self.outfile, &stats)
    }
}
