use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

/// Failures while decoding or storing an uploaded report.
///
/// All variants describe a problem with the submitted file and map to
/// 400 Bad Request.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Report is empty")]
    Empty,

    #[error("Failed to decompress report: {0}")]
    Decompress(String),

    #[error("Decompressed report exceeds {0} bytes")]
    TooLarge(usize),

    #[error("Zip archive contains no XML report")]
    NoXmlInArchive,

    #[error("Invalid aggregate report XML: {0}")]
    InvalidXml(String),

    #[error("Invalid forensic report: {0}")]
    InvalidForensic(String),

    /// The report's policy domain is not monitored by the organization.
    #[error("Domain '{0}' is not monitored by this organization")]
    UnknownDomain(String),

    /// The report was uploaded to a domain it doesn't describe.
    #[error("Report for '{reported}' does not belong to domain '{domain}'")]
    DomainMismatch { reported: String, domain: String },
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorDto {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
