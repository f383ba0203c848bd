//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "impresso-lid",
    about = "ensemble language identification for historical newspapers."
)]
/// Holds every command that is callable by the `impresso-lid` command.
pub enum ImpressoLid {
    #[structopt(about = "Annotate content items with all configured LID classifiers (stage 1a)")]
    Annotate(Annotate),
    #[structopt(about = "Aggregate collection-level ensemble statistics (stage 1b)")]
    Aggregate(Aggregate),
    #[structopt(about = "Decide one language per content item (stage 2)")]
    Decide(Decide),
}

#[derive(Debug, StructOpt)]
/// Annotate command and parameters.
pub struct Annotate {
    #[structopt(
        long,
        required = true,
        min_values = 1,
        help = "names of the LID classifiers to apply (do not add orig_lg here)"
    )]
    pub lids: Vec<String>,
    #[structopt(
        long = "impresso-ft",
        parse(from_os_str),
        help = "binary fastText model for the impresso_ft classifier"
    )]
    pub impresso_ft: Option<PathBuf>,
    #[structopt(
        long = "wp-ft",
        parse(from_os_str),
        help = "binary fastText Wikipedia model for the wp_ft classifier"
    )]
    pub wp_ft: Option<PathBuf>,
    #[structopt(
        long,
        default_value = "20",
        help = "minimal text length in characters to run the classifiers"
    )]
    pub minimal_text_length: usize,
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "-",
        help = "rebuilt input file (jsonl, optionally .gz/.bz2; - for stdin)"
    )]
    pub infile: PathBuf,
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "-",
        help = "stage-1 output file (jsonl, optionally .gz/.bz2; - for stdout)"
    )]
    pub outfile: PathBuf,
    #[structopt(long, default_value = "9", help = "round probabilities to n digits")]
    pub round_ndigits: i32,
    #[structopt(
        long,
        default_value = "",
        help = "git describe output to use as tool version"
    )]
    pub git_describe: String,
    #[structopt(long, help = "wait while the 1-minute load average is above this")]
    pub max_load: Option<f64>,
}

#[derive(Debug, StructOpt)]
/// Aggregate command and parameters.
pub struct Aggregate {
    #[structopt(long, help = "collection acronym; inferred from the first item if absent")]
    pub collection: Option<String>,
    #[structopt(
        long,
        required = true,
        min_values = 1,
        help = "names of the LID classifiers to tally (do not add orig_lg here)"
    )]
    pub lids: Vec<String>,
    #[structopt(
        long,
        help = "classifiers (or orig_lg) whose supported votes are boosted \
                [default: impresso_ft orig_lg]"
    )]
    pub boosted_lids: Vec<String>,
    #[structopt(
        long,
        default_value = "200",
        help = "minimal letters for an item to enter the statistics"
    )]
    pub minimal_text_length: usize,
    #[structopt(
        long,
        default_value = "0.5",
        help = "minimal alphabetical ratio for an item to enter the statistics"
    )]
    pub minimal_alphabetical_ratio: f64,
    #[structopt(long, default_value = "1.5", help = "boost factor for supported boosted voters")]
    pub boost_factor: f64,
    #[structopt(
        long,
        default_value = "1.5",
        help = "minimal vote score for an ensemble decision"
    )]
    pub minimal_vote_score: f64,
    #[structopt(
        long,
        default_value = "0.2",
        help = "minimal probability for a prediction to cast a vote"
    )]
    pub minimal_lid_probability: f64,
    #[structopt(long, default_value = "9", help = "round ratios to n digits")]
    pub round_ndigits: i32,
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "-",
        help = "statistics output file (JSON; - for stdout)"
    )]
    pub outfile: PathBuf,
    #[structopt(
        long,
        default_value = "",
        help = "git describe output to use as tool version"
    )]
    pub git_describe: String,
    #[structopt(
        parse(from_os_str),
        required = true,
        min_values = 1,
        help = "stage-1 files of one collection"
    )]
    pub infiles: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
/// Decide command and parameters.
pub struct Decide {
    #[structopt(
        long,
        required = true,
        min_values = 1,
        help = "names of the LID classifiers to consult (do not add orig_lg here)"
    )]
    pub lids: Vec<String>,
    #[structopt(
        long,
        default_value = "6",
        help = "voting weight for impresso_ft predicting Luxembourgish"
    )]
    pub weight_lb_impresso_ft: f64,
    #[structopt(
        long,
        default_value = "0.5",
        help = "minimal probability for a prediction to enter the vote"
    )]
    pub minimal_lid_probability: f64,
    #[structopt(
        long,
        default_value = "0.5",
        help = "minimal vote score for a voting decision"
    )]
    pub minimal_voting_score: f64,
    #[structopt(
        long,
        default_value = "50",
        help = "below this many characters the dominant language wins"
    )]
    pub minimal_text_length: usize,
    #[structopt(long, default_value = "1.5", help = "boost factor for supported boosted voters")]
    pub boost_factor: f64,
    #[structopt(
        long,
        default_value = "0.75",
        help = "ignore orig_lg when its ensemble support is below this"
    )]
    pub threshold_confidence_orig_lg: f64,
    #[structopt(
        short = "C",
        long,
        parse(from_os_str),
        help = "collection statistics JSON file"
    )]
    pub collection_stats_filename: PathBuf,
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "-",
        help = "stage-1 input file (jsonl, optionally .gz/.bz2; - for stdin)"
    )]
    pub infile: PathBuf,
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "-",
        help = "stage-2 output file (jsonl, optionally .gz/.bz2; - for stdout)"
    )]
    pub outfile: PathBuf,
    #[structopt(
        long,
        parse(from_os_str),
        help = "file for statistical diagnostics in JSON format"
    )]
    pub diagnostics_json: Option<PathBuf>,
    #[structopt(
        long,
        default_value = "",
        help = "git describe output to use as tool version"
    )]
    pub git_describe: String,
    #[structopt(long, help = "wait while the 1-minute load average is above this")]
    pub max_load: Option<f64>,
}
