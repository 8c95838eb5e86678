//! Core library for the client-recon command line application.
//!
//! The library builds a single, deduplicated master client table from
//! several independently maintained record sources: an appointment/billing
//! log, a client roster, and two external status trackers. The modules are
//! structured to keep responsibilities narrow and composable: the data
//! model lives in [`model`], name and date canonicalization in
//! [`normalize`] and [`temporal`], the merge engine in [`aggregate`],
//! [`consolidate`], [`matching`], and [`assemble`], spreadsheet adapters
//! under [`io`], and the batch orchestration in [`pipeline`].

pub mod aggregate;
pub mod assemble;
pub mod consolidate;
pub mod error;
pub mod io;
pub mod matching;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod temporal;

pub use error::{ReconError, Result};
pub use matching::MatchConfig;
pub use model::{
    CellValue, ClientRecord, MatchResult, OutputTable, RawRow, RowSet, StatusSourceEntry,
};
pub use pipeline::{ReconcileSummary, reconcile, reconcile_files};
