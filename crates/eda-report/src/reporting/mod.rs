//! Report generation module.
//!
//! This module turns a [`Profile`](crate::profiler::Profile) and rendered charts
//! into a downloadable PDF.
//!
//! # Example
//!
//! ```rust,ignore
//! use eda_report::reporting::ReportAssembler;
//!
//! let assembler = ReportAssembler::default();
//! let document = assembler.assemble(&profile, &charts, &table)?;
//! std::fs::write(document.file_name(), document.as_bytes())?;
//! ```

mod assembler;
mod document;

pub use assembler::ReportAssembler;
pub use document::{Block, ReportDocument};
