/*! Reading and writing facilities.

Readers and writers pick their codec from the file extension
(`.bz2`, `.gz`, anything else is plain text); `-` stands for
stdin/stdout. Writers are atomic: output lands in a
`<path>.working.<host>` file that is renamed into place on success.
[stamps] implements the `.running`/`.done` per-file ownership used for
cross-host coordination.
!*/
pub mod reader;
pub mod stamps;
pub mod writer;

pub use reader::JsonLines;
pub use writer::{write_json_atomic, JsonlWriter};

/// Hostname for stamp contents and working-file suffixes.
pub fn host() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown-host".to_string())
}
