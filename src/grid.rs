use crate::{
    model::{ColumnMapping, TargetSchema},
    table,
};

pub const UNMAPPED_LABEL: &str = "-- not mapped --";

/// Renders the mapping as an aligned text grid, one row per target column.
pub fn render_mapping_grid(schema: &TargetSchema, mappings: &[ColumnMapping]) -> String {
    let headers = ["target", "nullable", "csv column", "type"].map(str::to_string);
    let rows: Vec<Vec<String>> = mappings
        .iter()
        .map(|mapping| {
            let nullable = match schema.column(&mapping.target_col) {
                Some(column) if column.nullable => "yes",
                Some(_) => "no",
                None => "?",
            };
            vec![
                mapping.target_col.clone(),
                nullable.to_string(),
                mapping
                    .csv_col
                    .clone()
                    .unwrap_or_else(|| UNMAPPED_LABEL.to_string()),
                mapping.target_type.clone(),
            ]
        })
        .collect();
    table::render_table(&headers, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SchemaColumn;

    #[test]
    fn grid_aligns_columns_and_labels_unmapped() {
        let schema = TargetSchema::new(
            "t",
            vec![
                SchemaColumn::new("ID", "INT", false),
                SchemaColumn::new("Name", "NVARCHAR(100)", true),
            ],
        );
        let mappings = vec![
            ColumnMapping {
                target_col: "ID".to_string(),
                csv_col: Some("id".to_string()),
                target_type: "INT".to_string(),
            },
            ColumnMapping {
                target_col: "Name".to_string(),
                csv_col: None,
                target_type: "NVARCHAR(100)".to_string(),
            },
        ];
        let rendered = render_mapping_grid(&schema, &mappings);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "target  nullable  csv column        type",
                "------  --------  ----------------  -------------",
                "ID      no        id                INT",
                "Name    yes       -- not mapped --  NVARCHAR(100)",
            ]
        );
    }
}
