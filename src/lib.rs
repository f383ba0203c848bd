/*! Ensemble language identification for OCR-ed historical newspapers.

Three coupled stages: per-item multi-classifier annotation
([pipelines::Annotate]), collection-level ensemble statistics
([pipelines::Aggregate]) and a per-item decision engine
([pipelines::Decide]) that combines predictions, provider metadata and
collection statistics into one language label per content item.
!*/
pub mod cli;
pub mod content;
pub mod decision;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod identifiers;
pub mod io;
pub mod lang;
pub mod pipelines;
pub mod stats;
