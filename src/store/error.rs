//! Store Errors
//!
//! Error types for ledger store operations.

/// Errors that can occur in the ledger store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a domain record
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Check if the database gave up on a statement or lock wait
    pub fn is_timeout(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            // 57014 query_canceled (statement_timeout), 55P03 lock_not_available
            StoreError::Database(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("57014") | Some("55P03"))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Corrupt("unknown transfer status 'X'".to_string());
        assert_eq!(err.to_string(), "Corrupt record: unknown transfer status 'X'");
        assert!(!err.is_timeout());

        let err = StoreError::Database(sqlx::Error::PoolTimedOut);
        assert!(err.is_timeout());
    }
}
