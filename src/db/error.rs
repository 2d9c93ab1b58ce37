use std::error::Error;
use std::fmt;


#[derive(Debug)]
pub struct StoreError {
    pub kind: StoreErrorKind,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreError: {}", self.kind)
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum StoreErrorKind {
    /// A status flip expected to affect exactly one row affected `rows`.
    Consistency { name: String, rows: u64 },
    Sqlx(sqlx::Error),
    TransactionNotStarted,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consistency { name, rows } => {
                write!(f, "Tried to update migration '{name}' but updated {rows} rows instead of 1")
            }
            Self::Sqlx(e) => write!(f, "{e}"),
            Self::TransactionNotStarted => write!(f, "Transaction has not been started"),
        }
    }
}

impl Error for StoreErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlx(source) => Some(source),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError { kind: StoreErrorKind::Sqlx(error) }
    }
}
