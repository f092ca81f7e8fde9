/// Crate-wide result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying database operation failed.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// A stored row contains a value outside the expected enumeration.
    #[error("invalid {column} value in stored row: {value}")]
    InvalidColumn { column: &'static str, value: String },
}

impl Error {
    #[must_use]
    pub fn invalid_column(column: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column,
            value: value.into(),
        }
    }
}
