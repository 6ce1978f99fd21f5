//! Report error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("unsupported report format: {0}")]
    UnsupportedFormat(String),

    #[error("{format} renderer unavailable: rebuild with the `{feature}` feature")]
    RendererUnavailable {
        format: &'static str,
        feature: &'static str,
    },

    #[error("spreadsheet rendering failed: {0}")]
    Spreadsheet(String),

    #[error("document rendering failed: {0}")]
    Document(String),
}

impl ReportError {
    /// Text safe to show to the person who asked for the report.
    ///
    /// Storage failures are not described beyond a generic message; the full
    /// error belongs in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Database(_) => {
                "The report could not be generated. Please try again later.".to_string()
            }
            ReportError::UnsupportedFormat(format) => format!(
                "Unsupported report format \"{format}\". Choose spreadsheet or paginated-document."
            ),
            ReportError::RendererUnavailable { format, feature } => format!(
                "The {format} export is not available on this server. Install it by building with the \"{feature}\" feature."
            ),
            ReportError::Spreadsheet(_) | ReportError::Document(_) => {
                "The report file could not be produced. Please try again later.".to_string()
            }
        }
    }
}

#[cfg(feature = "xlsx")]
impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Spreadsheet(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unsupported_format() {
        let err = ReportError::UnsupportedFormat("csv".into());
        assert_eq!(err.to_string(), "unsupported report format: csv");
    }

    #[test]
    fn test_display_renderer_unavailable() {
        let err = ReportError::RendererUnavailable {
            format: "spreadsheet",
            feature: "xlsx",
        };
        assert_eq!(
            err.to_string(),
            "spreadsheet renderer unavailable: rebuild with the `xlsx` feature"
        );
    }

    #[test]
    fn test_from_db_error() {
        let err: ReportError = sea_orm::DbErr::Custom("connection refused".into()).into();
        assert!(matches!(err, ReportError::Database(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_user_message_hides_database_details() {
        let err: ReportError = sea_orm::DbErr::Custom("password authentication failed".into()).into();
        let msg = err.user_message();
        assert!(!msg.contains("password"));
        assert!(msg.contains("could not be generated"));
    }

    #[test]
    fn test_user_messages_are_distinct_per_category() {
        let unsupported = ReportError::UnsupportedFormat("csv".into()).user_message();
        let unavailable = ReportError::RendererUnavailable {
            format: "paginated-document",
            feature: "pdf",
        }
        .user_message();
        assert!(unsupported.contains("Unsupported report format"));
        assert!(unsupported.contains("csv"));
        assert!(unavailable.contains("not available"));
        assert!(unavailable.contains("pdf"));
        assert_ne!(unsupported, unavailable);
    }
}
