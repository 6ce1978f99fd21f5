//! Report output formats.

use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;
use crate::sections::ReportBundle;

#[cfg(feature = "pdf")]
mod document;
#[cfg(feature = "xlsx")]
mod spreadsheet;

/// Output format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Spreadsheet,
    PaginatedDocument,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Spreadsheet => "spreadsheet",
            ReportFormat::PaginatedDocument => "paginated-document",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::PaginatedDocument => "application/pdf",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            ReportFormat::Spreadsheet => "music_advanced_report.xlsx",
            ReportFormat::PaginatedDocument => "music_service_report.pdf",
        }
    }

    /// Cargo feature that compiles this renderer in.
    pub fn feature(self) -> &'static str {
        match self {
            ReportFormat::Spreadsheet => "xlsx",
            ReportFormat::PaginatedDocument => "pdf",
        }
    }

    pub fn is_available(self) -> bool {
        match self {
            ReportFormat::Spreadsheet => cfg!(feature = "xlsx"),
            ReportFormat::PaginatedDocument => cfg!(feature = "pdf"),
        }
    }

    /// Fails before any data is read when this build cannot render `self`.
    pub fn ensure_available(self) -> Result<(), ReportError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(ReportError::RendererUnavailable {
                format: self.as_str(),
                feature: self.feature(),
            })
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "spreadsheet" | "xlsx" | "excel" => Ok(ReportFormat::Spreadsheet),
            "paginated-document" | "pdf" => Ok(ReportFormat::PaginatedDocument),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// A finished report file.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub format: ReportFormat,
    pub bytes: Vec<u8>,
}

impl RenderedReport {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn filename(&self) -> &'static str {
        self.format.filename()
    }
}

/// Render `bundle` as `format`. CPU-bound; async callers should run it on a
/// blocking thread.
pub fn render(bundle: &ReportBundle, format: ReportFormat) -> Result<RenderedReport, ReportError> {
    format.ensure_available()?;

    let bytes = match format {
        ReportFormat::Spreadsheet => render_spreadsheet(bundle)?,
        ReportFormat::PaginatedDocument => render_document(bundle)?,
    };

    tracing::debug!(format = %format, bytes = bytes.len(), "report rendered");
    Ok(RenderedReport { format, bytes })
}

#[cfg(feature = "xlsx")]
fn render_spreadsheet(bundle: &ReportBundle) -> Result<Vec<u8>, ReportError> {
    spreadsheet::render(bundle)
}

#[cfg(not(feature = "xlsx"))]
fn render_spreadsheet(_bundle: &ReportBundle) -> Result<Vec<u8>, ReportError> {
    Err(ReportError::RendererUnavailable {
        format: ReportFormat::Spreadsheet.as_str(),
        feature: ReportFormat::Spreadsheet.feature(),
    })
}

#[cfg(feature = "pdf")]
fn render_document(bundle: &ReportBundle) -> Result<Vec<u8>, ReportError> {
    document::render(bundle)
}

#[cfg(not(feature = "pdf"))]
fn render_document(_bundle: &ReportBundle) -> Result<Vec<u8>, ReportError> {
    Err(ReportError::RendererUnavailable {
        format: ReportFormat::PaginatedDocument.as_str(),
        feature: ReportFormat::PaginatedDocument.feature(),
    })
}
