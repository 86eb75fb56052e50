//! SQL text helpers shared by the DDL and DML compilers.

/// Collapse all whitespace runs to single spaces and trim the ends.
///
/// Every compiled statement passes through here so the generated surface is
/// single-line and whitespace-normalized regardless of how it was assembled.
#[must_use]
pub fn normalize_statement(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_interior_whitespace() {
        assert_eq!(
            normalize_statement("select *   from  t\n where id = 1 "),
            "select * from t where id = 1"
        );
    }

    #[test]
    fn test_normalize_is_identity_on_clean_statements() {
        let clean = "drop table if exists t";
        assert_eq!(normalize_statement(clean), clean);
    }
}
