//! Catalog analytics report: aggregation over the music catalog and its
//! spreadsheet / paginated-document renderings.
//!
//! [`generate_report`] reads a [`CatalogSnapshot`] from a [`CatalogSource`] and
//! ranks it into a [`ReportBundle`]; [`render`] turns a bundle into bytes for one
//! [`ReportFormat`].

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod layout;
pub mod render;
pub mod sections;
pub mod snapshot;
pub mod text;

#[cfg(test)]
mod fixtures;

pub use aggregate::{aggregate, generate_report};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ReportError;
pub use render::{render, RenderedReport, ReportFormat};
pub use sections::ReportBundle;
pub use snapshot::{CatalogSnapshot, CatalogSource};
