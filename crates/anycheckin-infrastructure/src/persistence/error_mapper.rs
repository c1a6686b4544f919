use anycheckin_domain::shared::DomainError;

/// Translates storage-layer failures into [`DomainError`]s, keeping the
/// operation name in the message.
pub struct RepositoryErrorMapper;

impl RepositoryErrorMapper {
    pub fn map_sqlx_error(error: sqlx::Error, context: &str) -> DomainError {
        match &error {
            sqlx::Error::RowNotFound => {
                DomainError::NotFound(format!("{}: record not found", context))
            }
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                DomainError::DataIntegrity(format!("{}: {}", context, db_error.message()))
            }
            sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation() => {
                DomainError::DataIntegrity(format!("{}: {}", context, db_error.message()))
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DomainError::DataIntegrity(format!("{}: {}", context, error))
            }
            _ => DomainError::Repository(format!("{}: {}", context, error)),
        }
    }

    pub fn map_json_error(error: serde_json::Error, context: &str) -> DomainError {
        DomainError::Serialization(format!("{}: {}", context, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let mapped = RepositoryErrorMapper::map_sqlx_error(sqlx::Error::RowNotFound, "Load task");
        assert!(matches!(mapped, DomainError::NotFound(ref msg) if msg.starts_with("Load task")));
    }

    #[test]
    fn test_other_errors_map_to_repository() {
        let mapped = RepositoryErrorMapper::map_sqlx_error(sqlx::Error::PoolTimedOut, "List");
        assert!(matches!(mapped, DomainError::Repository(_)));
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let error = serde_json::from_str::<Vec<i64>>("[1,").unwrap_err();
        let mapped = RepositoryErrorMapper::map_json_error(error, "Decode ids");
        assert!(matches!(mapped, DomainError::Serialization(_)));
    }
}
