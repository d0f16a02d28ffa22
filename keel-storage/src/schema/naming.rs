//! Constraint and index names

/// `PK_<Table>`
pub fn primary_key(table: &str) -> String {
    format!("PK_{}", table)
}

/// `FK_<Table>_<RefTable>_<Column>`
pub fn foreign_key(table: &str, ref_table: &str, column: &str) -> String {
    format!("FK_{}_{}_{}", table, ref_table, column)
}

/// `IX_<Table>_<Col1>_<Col2>...`
pub fn index<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let mut name = format!("IX_{}", table);
    for column in columns {
        name.push('_');
        name.push_str(column.as_ref());
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(primary_key("Deals"), "PK_Deals");
        assert_eq!(
            foreign_key("Deals", "Pipelines", "PipelineId"),
            "FK_Deals_Pipelines_PipelineId"
        );
        assert_eq!(
            index("TenantUsers", &["TenantId", "ApplicationUserId"]),
            "IX_TenantUsers_TenantId_ApplicationUserId"
        );
    }
}
