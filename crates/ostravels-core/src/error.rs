//! Error types for loading the visa dataset.

use thiserror::Error;

/// Errors raised while building a [`VisaDb`](crate::visa::VisaDb).
///
/// Resolution and conversation handling never fail; only getting the
/// dataset into memory can.
#[derive(Error, Debug)]
pub enum VisaDataError {
    /// The dataset file could not be read
    #[error("Failed to read visa dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The dataset is not a JSON array of country records
    #[error("Invalid visa dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Visa dataset contains no countries")]
    Empty,

    #[error("Country record at index {index} has a blank name")]
    BlankName { index: usize },

    #[error("Country '{name}' appears more than once in the visa dataset")]
    DuplicateCountry { name: String },
}
