//! Page assembly and batch orchestration for qaharvest.
//!
//! [`assembler`] turns one rendered question page into a
//! [`PageRecord`](qaharvest_shared::PageRecord); [`pipeline`] runs that over a
//! URL list with bounded concurrency and hands the batch to a sink.

pub mod assembler;
pub mod pipeline;

pub use assembler::{AssembledPage, FragmentError, PageLayout, assemble_document, assemble_page};
pub use pipeline::{BatchConfig, BatchResult, ProgressReporter, SilentProgress, harvest, run_batch};
