/*! Language identification backends.

Holds an [Identifier] trait that every backend implements, and a
[Registry] that binds the configured classifier names to concrete
backends. fastText-based backends load their model binaries at
construction time; the remaining backends ship their models in the
crate and are always available.
!*/
mod composite;
mod fasttext;
mod identification;
mod lingua;
mod registry;
mod whatlang;
mod whichlang;

pub use composite::Composite;
pub use fasttext::FastText;
pub use identification::{LanguageProb, LidOutput, SkipReason};
pub use lingua::Lingua;
pub use registry::Registry;
pub use whatlang::Whatlang;
pub use whichlang::Whichlang;

use crate::error::Error;

/// Canonical classifier names.
pub const IMPRESSO_FT: &str = "impresso_ft";
pub const WP_FT: &str = "wp_ft";
pub const LANGID: &str = "langid";
pub const LANGDETECT: &str = "langdetect";
pub const LINGUA: &str = "lingua";
pub const IMPRESSO_PIPELINE: &str = "impresso_langident_pipeline";

/// Name under which provider metadata votes; not a backend.
pub const ORIG_LG: &str = "orig_lg";

pub trait Identifier {
    /// The configured name of this classifier instance.
    fn name(&self) -> &str;

    /// Ranked per-language probabilities for `text`, best first.
    ///
    /// `Ok(None)` means the backend refused to commit to a language;
    /// errors are per-item and never abort the pipeline.
    fn identify(&self, text: &str) -> Result<Option<Vec<LanguageProb>>, Error>;

    /// The languages the backend can emit, when the set is closed and
    /// known up front.
    fn languages(&self) -> Option<Vec<String>> {
        None
    }
}
