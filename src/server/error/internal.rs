use std::num::ParseIntError;
use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Failure to parse id from String
    ///
    /// Results a in 500 Internal Server Error with a generic message returned
    /// to client.
    #[error("Failed to parse ID from String '{value}': {source}")]
    ParseStringId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// A value stored in an enum-like string column is not recognised.
    ///
    /// Indicates a row written outside the application or a missing migration.
    #[error("Unknown value '{value}' stored in column {column}")]
    UnknownColumnValue {
        /// Name of the column
        column: &'static str,
        /// The stored value
        value: String,
    },
}
