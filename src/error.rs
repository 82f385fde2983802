use polars::prelude::PolarsError;

/// Everything the aggregators can fail with. All of these are fatal for the
/// run; nothing is retried and no partial tables are returned.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("top-N must be between {min} and {max} (got {value})")]
    InvalidRange { value: usize, min: usize, max: usize },

    #[error("data alignment error: {0}")]
    DataAlignment(String),

    #[error("no ISO-3166 code known for country '{0}'")]
    UnknownCountry(String),

    #[error("invalid country code '{0}': expected two ASCII letters")]
    InvalidCode(String),

    #[error("missing data: {0}")]
    MissingData(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {table}: {source}")]
    Csv { table: String, source: csv::Error },

    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
