use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellDataType {
    Text,
    Number,
    Date,
    Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FilterKind {
    #[serde(rename = "agTextColumnFilter")]
    Text,
    #[serde(rename = "agNumberColumnFilter")]
    Number,
    #[serde(rename = "agDateColumnFilter")]
    Date,
}

/// `filter: true` (library default filter) or a named filter component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Enabled(bool),
    Kind(FilterKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOption {
    Contains,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Equals,
    InRange,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub filter_options: Vec<FilterOption>,
    pub buttons: Vec<String>,
    pub max_num_conditions: u8,
}

impl FilterParams {
    pub fn contains() -> Self {
        Self::single_condition(vec![FilterOption::Contains])
    }

    pub fn numeric_range() -> Self {
        Self::single_condition(vec![
            FilterOption::GreaterThanOrEqual,
            FilterOption::LessThanOrEqual,
            FilterOption::Equals,
            FilterOption::InRange,
        ])
    }

    fn single_condition(filter_options: Vec<FilterOption>) -> Self {
        Self {
            filter_options,
            buttons: vec!["reset".to_string()],
            max_num_conditions: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pinned {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

/// Named cell renderers registered by the page script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CellRenderer {
    /// Renders a non-empty value as a plain-looking anchor that underlines on hover.
    #[serde(rename = "statgridLink")]
    Link,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub background_color: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMatch {
    /// Cell value is exactly `value`.
    Equals,
    /// Cell value is a string containing `value`.
    Contains,
}

/// Applies `style` to a cell whose value matches `value` under `mode`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellStyleRule {
    #[serde(rename = "match")]
    pub mode: StyleMatch,
    pub value: serde_json::Value,
    pub style: CellStyle,
}

impl CellStyleRule {
    pub fn matches(&self, cell: &serde_json::Value) -> bool {
        match self.mode {
            StyleMatch::Equals => &self.value == cell,
            StyleMatch::Contains => match (cell.as_str(), self.value.as_str()) {
                (Some(text), Some(needle)) => text.contains(needle),
                _ => false,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_data_type: Option<CellDataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_params: Option<FilterParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_row_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Pinned>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_func: Option<AggFunc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_renderer: Option<CellRenderer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cell_style_rules: Vec<CellStyleRule>,
}

impl ColumnDef {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header_name: None,
            header_tooltip: None,
            cell_data_type: None,
            filter: None,
            filter_params: None,
            sortable: None,
            row_group: None,
            enable_row_group: None,
            hide: None,
            pinned: None,
            agg_func: None,
            min_width: None,
            width: None,
            cell_renderer: None,
            cell_style_rules: Vec::new(),
        }
    }

    pub fn text(field: impl Into<String>) -> Self {
        Self::new(field).data_type(CellDataType::Text)
    }

    pub fn number(field: impl Into<String>) -> Self {
        Self::new(field).data_type(CellDataType::Number)
    }

    pub fn date(field: impl Into<String>) -> Self {
        Self::new(field)
            .data_type(CellDataType::Date)
            .filter_kind(FilterKind::Date)
    }

    /// Visible text column that can be dragged into the row-group panel.
    pub fn category(field: impl Into<String>) -> Self {
        let mut col = Self::text(field).text_filter();
        col.row_group = Some(false);
        col.enable_row_group = Some(true);
        col.hide = Some(false);
        col
    }

    /// Text column the rows are grouped by; hidden because the group rows show it.
    pub fn grouping(field: impl Into<String>) -> Self {
        let mut col = Self::text(field).text_filter();
        col.row_group = Some(true);
        col.enable_row_group = Some(true);
        col.hide = Some(true);
        col
    }

    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.header_name = Some(name.into());
        self
    }

    pub fn tooltip(mut self, text: impl Into<String>) -> Self {
        self.header_tooltip = Some(text.into());
        self
    }

    pub fn data_type(mut self, data_type: CellDataType) -> Self {
        self.cell_data_type = Some(data_type);
        self
    }

    pub fn filter_kind(mut self, kind: FilterKind) -> Self {
        self.filter = Some(FilterValue::Kind(kind));
        self
    }

    pub fn text_filter(mut self) -> Self {
        self.filter = Some(FilterValue::Kind(FilterKind::Text));
        self.filter_params = Some(FilterParams::contains());
        self
    }

    pub fn number_filter(mut self) -> Self {
        self.filter = Some(FilterValue::Kind(FilterKind::Number));
        self.filter_params = Some(FilterParams::numeric_range());
        self
    }

    /// Plain sortable column with the library's default filter.
    pub fn basic(mut self) -> Self {
        self.sortable = Some(true);
        self.filter = Some(FilterValue::Enabled(true));
        self
    }

    pub fn pinned(mut self, side: Pinned) -> Self {
        self.pinned = Some(side);
        self
    }

    pub fn width(mut self, px: u32) -> Self {
        self.width = Some(px);
        self
    }

    pub fn sum(mut self) -> Self {
        self.agg_func = Some(AggFunc::Sum);
        self
    }

    pub fn link(mut self) -> Self {
        self.cell_renderer = Some(CellRenderer::Link);
        self
    }

    pub fn highlight_when(
        self,
        equals: impl Into<serde_json::Value>,
        background_color: impl Into<String>,
    ) -> Self {
        self.highlight(StyleMatch::Equals, equals.into(), background_color.into())
    }

    /// Highlights text cells containing `needle` (`"W"` matches `"OTW"`).
    pub fn highlight_containing(
        self,
        needle: impl Into<String>,
        background_color: impl Into<String>,
    ) -> Self {
        self.highlight(
            StyleMatch::Contains,
            serde_json::Value::String(needle.into()),
            background_color.into(),
        )
    }

    fn highlight(mut self, mode: StyleMatch, value: serde_json::Value, background_color: String) -> Self {
        self.cell_style_rules.push(CellStyleRule {
            mode,
            value,
            style: CellStyle { background_color },
        });
        self
    }

    /// Style for `value`, first matching rule wins.
    pub fn style_for(&self, value: &serde_json::Value) -> Option<&CellStyle> {
        self.cell_style_rules
            .iter()
            .find(|rule| rule.matches(value))
            .map(|rule| &rule.style)
    }

    /// Heading shown for the column.
    pub fn display_name(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.field)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnGroup {
    pub header_name: String,
    pub children: Vec<ColumnDef>,
}

impl ColumnGroup {
    pub fn new(header_name: impl Into<String>, children: Vec<ColumnDef>) -> Self {
        Self {
            header_name: header_name.into(),
            children,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnNode {
    Column(ColumnDef),
    Group(ColumnGroup),
}

impl ColumnNode {
    /// Leaf columns in display order.
    pub fn leaves(&self) -> Vec<&ColumnDef> {
        match self {
            ColumnNode::Column(col) => vec![col],
            ColumnNode::Group(group) => group.children.iter().collect(),
        }
    }
}

impl From<ColumnDef> for ColumnNode {
    fn from(value: ColumnDef) -> Self {
        ColumnNode::Column(value)
    }
}

impl From<ColumnGroup> for ColumnNode {
    fn from(value: ColumnGroup) -> Self {
        ColumnNode::Group(value)
    }
}
