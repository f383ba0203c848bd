use log::{debug, error, warn};
use structopt::StructOpt;

use impresso_lid::cli::ImpressoLid;
use impresso_lid::identifiers::{IMPRESSO_FT, ORIG_LG};
use impresso_lid::io::stamps;
use impresso_lid::pipelines::{Aggregate, Annotate, Decide, Pipeline};
use impresso_lid::stats::AggregatorConfig;

fn main() {
    env_logger::init();

    if let Err(e) = stamps::install_signal_handler() {
        warn!("{:?}", e);
    }

    let opt = ImpressoLid::from_args();
    debug!("cli args\n{:#?}", opt);

    let result = match opt {
        ImpressoLid::Annotate(args) => Annotate {
            infile: args.infile,
            outfile: args.outfile,
            lids: args.lids,
            impresso_ft: args.impresso_ft,
            wp_ft: args.wp_ft,
            minimal_text_length: args.minimal_text_length,
            round_ndigits: args.round_ndigits,
            git_describe: args.git_describe,
            max_load: args.max_load,
        }
        .run(),
        ImpressoLid::Aggregate(args) => {
            let boosted_lids = if args.boosted_lids.is_empty() {
                vec![IMPRESSO_FT.to_string(), ORIG_LG.to_string()]
            } else {
                args.boosted_lids
            };
            Aggregate {
                collection: args.collection,
                infiles: args.infiles,
                outfile: args.outfile,
                cfg: AggregatorConfig {
                    lids: args.lids,
                    boosted_lids,
                    minimal_text_length: args.minimal_text_length,
                    minimal_alphabetical_ratio: args.minimal_alphabetical_ratio,
                    boost_factor: args.boost_factor,
                    minimal_vote_score: args.minimal_vote_score,
                    minimal_lid_probability: args.minimal_lid_probability,
                    round_ndigits: args.round_ndigits,
                    tool_version: if args.git_describe.is_empty() {
                        env!("CARGO_PKG_VERSION").to_string()
                    } else {
                        args.git_describe
                    },
                },
            }
            .run()
        }
        ImpressoLid::Decide(args) => Decide {
            infile: args.infile,
            outfile: args.outfile,
            collection_stats_filename: args.collection_stats_filename,
            diagnostics_json: args.diagnostics_json,
            cfg: impresso_lid::decision::DecisionConfig {
                lids: args.lids,
                weight_lb_impresso_ft: args.weight_lb_impresso_ft,
                minimal_lid_probability: args.minimal_lid_probability,
                minimal_voting_score: args.minimal_voting_score,
                minimal_text_length: args.minimal_text_length,
                boost_factor: args.boost_factor,
                boosted_lids: vec![IMPRESSO_FT.to_string(), ORIG_LG.to_string()],
                trust_threshold: args.threshold_confidence_orig_lg,
            },
            git_describe: args.git_describe,
            max_load: args.max_load,
        }
        .run(),
    };

    if let Err(e) = result {
        error!("{:?}", e);
        std::process::exit(e.exit_code());
    }
}
