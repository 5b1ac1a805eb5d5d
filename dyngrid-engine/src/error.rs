//! FILENAME: dyngrid-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Grid definition is missing its {0}")]
    MissingFunction(&'static str),

    #[error("Invalid item size {width}x{height}: both dimensions must be positive and finite")]
    InvalidItemSize { width: f64, height: f64 },

    #[error("Record {record_index} has a row key that was not discovered in this pass")]
    UnknownRowKey { record_index: usize },

    #[error("Record {record_index} has a column key that was not discovered in this pass")]
    UnknownColumnKey { record_index: usize },
}

impl GridError {
    /// Contract violations abandon the rebuild pass; configuration errors never reach a pass.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            GridError::UnknownRowKey { .. } | GridError::UnknownColumnKey { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GridError::MissingFunction("aggregator");
        assert_eq!(err.to_string(), "Grid definition is missing its aggregator");

        let err = GridError::UnknownColumnKey { record_index: 7 };
        assert!(err.to_string().contains("Record 7"));
    }

    #[test]
    fn test_contract_violation_classification() {
        assert!(GridError::UnknownRowKey { record_index: 0 }.is_contract_violation());
        assert!(!GridError::InvalidItemSize { width: 0.0, height: 1.0 }.is_contract_violation());
    }
}
