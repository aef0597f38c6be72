use serde::Serialize;

use super::column::{FilterParams, FilterValue};
use crate::loader::NULL_SENTINEL;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowGroupPanelShow {
    Always,
    OnlyWhenGrouping,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupDisplayType {
    SingleColumn,
    MultipleColumns,
    GroupRows,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DomLayout {
    Normal,
    AutoHeight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AutoSizeStrategy {
    FitCellContents,
    FitGridWidth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRowRendererParams {
    pub suppress_count: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultColDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resizable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_filter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_params: Option<FilterParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    /// Values equal to this render as blank cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_sentinel: Option<String>,
}

impl DefaultColDef {
    /// Sortable, resizable, floating filter.
    pub fn interactive() -> Self {
        Self {
            sortable: Some(true),
            resizable: Some(true),
            floating_filter: Some(true),
            ..Self::default()
        }
    }

    pub fn blank_nulls(mut self) -> Self {
        self.null_sentinel = Some(NULL_SENTINEL.to_string());
        self
    }
}

/// Global presentation options of one grid instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_show_delay: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_group_panel_show: Option<RowGroupPanelShow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_default_expanded: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_display_type: Option<GroupDisplayType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_row_renderer_params: Option<GroupRowRendererParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_agg_func_in_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_size_strategy: Option<AutoSizeStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_layout: Option<DomLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animate_rows: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_cell_text_selection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensure_dom_order: Option<bool>,
    pub default_col_def: DefaultColDef,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            theme: None,
            tooltip_show_delay: None,
            row_group_panel_show: None,
            group_default_expanded: None,
            group_display_type: None,
            group_row_renderer_params: None,
            suppress_agg_func_in_header: None,
            auto_size_strategy: None,
            dom_layout: None,
            animate_rows: None,
            enable_cell_text_selection: None,
            ensure_dom_order: None,
            default_col_def: DefaultColDef::interactive(),
        }
    }
}

impl GridOptions {
    /// Grouped statistical log: rows grouped by season and game type,
    /// tooltips after 500ms, columns sized to their contents.
    pub fn grouped_log(panel: RowGroupPanelShow, expanded: i32) -> Self {
        Self {
            theme: Some("legacy".to_string()),
            tooltip_show_delay: Some(500),
            row_group_panel_show: Some(panel),
            group_default_expanded: Some(expanded),
            group_display_type: Some(GroupDisplayType::GroupRows),
            group_row_renderer_params: Some(GroupRowRendererParams {
                suppress_count: false,
            }),
            suppress_agg_func_in_header: Some(true),
            auto_size_strategy: Some(AutoSizeStrategy::FitCellContents),
            default_col_def: DefaultColDef::interactive(),
            ..Self::default()
        }
    }

    /// Flat roster table that grows with its rows.
    pub fn roster() -> Self {
        Self {
            dom_layout: Some(DomLayout::AutoHeight),
            animate_rows: Some(true),
            enable_cell_text_selection: Some(true),
            ensure_dom_order: Some(true),
            default_col_def: DefaultColDef {
                resizable: Some(true),
                min_width: Some(100),
                filter: Some(FilterValue::Enabled(true)),
                floating_filter: Some(true),
                ..DefaultColDef::default()
            },
            ..Self::default()
        }
    }

    pub fn blank_nulls(mut self) -> Self {
        self.default_col_def = self.default_col_def.blank_nulls();
        self
    }

    pub fn default_filter(mut self, filter: FilterValue, params: Option<FilterParams>) -> Self {
        self.default_col_def.filter = Some(filter);
        self.default_col_def.filter_params = params;
        self
    }
}
