//! Grid configuration modelled as data.
//!
//! Everything here serializes to the option object the grid library takes
//! (`columnDefs`, `defaultColDef`, `rowData`, ...). Behaviour the library
//! expects as callbacks (link rendering, conditional cell styles, blanking
//! the null sentinel) is carried as plain values and turned into callbacks by
//! the page script, so a configuration can be validated and inspected without
//! the rendering library.

pub mod column;
pub mod options;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::loader::RowRecord;

pub use column::{
    AggFunc, CellDataType, CellRenderer, CellStyle, CellStyleRule, ColumnDef, ColumnGroup,
    ColumnNode, FilterKind, FilterOption, FilterParams, FilterValue, Pinned, StyleMatch,
};
pub use options::{
    AutoSizeStrategy, DefaultColDef, DomLayout, GroupDisplayType, GroupRowRendererParams,
    GridOptions, RowGroupPanelShow,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridConfigError {
    #[error("grid has no columns")]
    NoColumns,

    #[error("column {index} has an empty field name")]
    EmptyField { index: usize },

    #[error("duplicate column field '{field}'")]
    DuplicateField { field: String },

    #[error("column group '{header}' has no children")]
    EmptyGroup { header: String },

    #[error("invalid colour '{color}' in style rule for '{field}'")]
    InvalidColor { field: String, color: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(flatten)]
    pub options: GridOptions,
    pub column_defs: Vec<ColumnNode>,
    pub row_data: Vec<RowRecord>,
}

impl GridConfig {
    pub fn new(options: GridOptions, column_defs: Vec<ColumnNode>, row_data: Vec<RowRecord>) -> Self {
        Self {
            options,
            column_defs,
            row_data,
        }
    }

    pub fn leaf_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.column_defs.iter().flat_map(|node| node.leaves())
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDef> {
        self.leaf_columns().find(|c| c.field == field)
    }

    pub fn validate(&self) -> Result<(), GridConfigError> {
        validate_columns(&self.column_defs)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Checks a column schema independently of any row data.
pub fn validate_columns(columns: &[ColumnNode]) -> Result<(), GridConfigError> {
    if columns.is_empty() {
        return Err(GridConfigError::NoColumns);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut index = 0usize;
    for node in columns {
        if let ColumnNode::Group(group) = node {
            if group.children.is_empty() {
                return Err(GridConfigError::EmptyGroup {
                    header: group.header_name.clone(),
                });
            }
        }
        for col in node.leaves() {
            if col.field.trim().is_empty() {
                return Err(GridConfigError::EmptyField { index });
            }
            if !seen.insert(col.field.as_str()) {
                return Err(GridConfigError::DuplicateField {
                    field: col.field.clone(),
                });
            }
            for rule in &col.cell_style_rules {
                if !is_hex_color(&rule.style.background_color) {
                    return Err(GridConfigError::InvalidColor {
                        field: col.field.clone(),
                        color: rule.style.background_color.clone(),
                    });
                }
            }
            index += 1;
        }
    }
    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Display text for a cell value; the null sentinel renders blank.
pub fn format_cell(value: &serde_json::Value, null_sentinel: Option<&str>) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) if Some(s.as_str()) == null_sentinel => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Vec<ColumnNode> {
        vec![
            ColumnDef::grouping("Season").tooltip("Season").into(),
            ColumnDef::category("Result").highlight_when("W", "#D0F8AB").into(),
            ColumnGroup::new(
                "Score",
                vec![
                    ColumnDef::number("Tm Sc").header("Tm").sum(),
                    ColumnDef::number("Opp Sc").header("Opp").sum(),
                ],
            )
            .into(),
        ]
    }

    #[test]
    fn serializes_to_grid_library_keys() {
        let cfg = GridConfig::new(
            GridOptions::grouped_log(RowGroupPanelShow::Always, 2).blank_nulls(),
            schema(),
            vec![json!({"Season": "2024", "Tm Sc": 4}).as_object().cloned().unwrap()],
        );
        let v = serde_json::to_value(&cfg).unwrap();
        assert_eq!(v["tooltipShowDelay"], json!(500));
        assert_eq!(v["autoSizeStrategy"], json!({"type": "fitCellContents"}));
        assert_eq!(v["groupDisplayType"], json!("groupRows"));
        assert_eq!(v["defaultColDef"]["nullSentinel"], json!("NULL"));
        assert_eq!(v["columnDefs"][0]["rowGroup"], json!(true));
        assert_eq!(v["columnDefs"][0]["hide"], json!(true));
        assert_eq!(v["columnDefs"][0]["filter"], json!("agTextColumnFilter"));
        assert_eq!(
            v["columnDefs"][0]["filterParams"],
            json!({"filterOptions": ["contains"], "buttons": ["reset"], "maxNumConditions": 1})
        );
        assert_eq!(v["columnDefs"][2]["children"][1]["aggFunc"], json!("sum"));
        assert_eq!(v["rowData"][0]["Tm Sc"], json!(4));
        assert!(v["columnDefs"][2].get("field").is_none());
    }

    #[test]
    fn validate_rejects_duplicate_fields_across_groups() {
        let mut columns = schema();
        columns.push(ColumnDef::number("Tm Sc").into());
        assert_eq!(
            validate_columns(&columns),
            Err(GridConfigError::DuplicateField {
                field: "Tm Sc".to_string()
            })
        );
    }

    #[test]
    fn validate_rejects_bad_colours_and_empty_groups() {
        let bad = vec![ColumnDef::text("Result").highlight_when("W", "green").into()];
        assert!(matches!(
            validate_columns(&bad),
            Err(GridConfigError::InvalidColor { .. })
        ));
        let empty = vec![ColumnGroup::new("Power Play", vec![]).into()];
        assert!(matches!(
            validate_columns(&empty),
            Err(GridConfigError::EmptyGroup { .. })
        ));
        assert_eq!(validate_columns(&[]), Err(GridConfigError::NoColumns));
    }

    #[test]
    fn style_rule_matches_exact_value_only() {
        let col = ColumnDef::text("Result").highlight_when("W", "#D0F8AB");
        assert_eq!(
            col.style_for(&json!("W")).map(|s| s.background_color.as_str()),
            Some("#D0F8AB")
        );
        assert!(col.style_for(&json!("L")).is_none());
        assert!(col.style_for(&json!("OTW")).is_none());
    }

    #[test]
    fn contains_rule_highlights_every_win_variant() {
        let col = ColumnDef::category("Result").highlight_containing("W", "#D0F8AB");
        for win in ["W", "W 4-2", "OTW", "SOW"] {
            assert_eq!(
                col.style_for(&json!(win)).map(|s| s.background_color.as_str()),
                Some("#D0F8AB"),
                "{win}"
            );
        }
        assert!(col.style_for(&json!("L")).is_none());
        assert!(col.style_for(&json!(1)).is_none());
        assert!(col.style_for(&serde_json::Value::Null).is_none());

        let v = serde_json::to_value(&col).unwrap();
        assert_eq!(
            v["cellStyleRules"],
            json!([{"match": "contains", "value": "W", "style": {"backgroundColor": "#D0F8AB"}}])
        );
    }

    #[test]
    fn null_sentinel_renders_blank() {
        assert_eq!(format_cell(&json!("NULL"), Some("NULL")), "");
        assert_eq!(format_cell(&json!("NULL"), None), "NULL");
        assert_eq!(format_cell(&json!(12), Some("NULL")), "12");
        assert_eq!(format_cell(&json!("18:42"), Some("NULL")), "18:42");
    }
}
