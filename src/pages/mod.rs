//! Page catalog: which resources each page loads, where its grids mount
//! and how their columns look.

pub mod player;
pub mod team;

use crate::grid::{ColumnNode, GridConfig, GridConfigError, GridOptions};
use crate::loader::{ResourceRef, RowRecord};

/// Mount id used by single-grid pages.
pub const DEFAULT_MOUNT_ID: &str = "myGrid";

/// Drops summary rows whose `field` holds one of `values`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowExclusion {
    pub field: String,
    pub values: Vec<String>,
}

impl RowExclusion {
    pub fn new(field: impl Into<String>, values: &[&str]) -> Self {
        Self {
            field: field.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn excludes(&self, row: &RowRecord) -> bool {
        match row.get(&self.field).and_then(|v| v.as_str()) {
            Some(value) => self.values.iter().any(|v| v == value),
            None => false,
        }
    }

    pub fn apply(&self, rows: Vec<RowRecord>) -> Vec<RowRecord> {
        rows.into_iter().filter(|row| !self.excludes(row)).collect()
    }
}

/// One grid on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    pub mount_id: String,
    pub resources: Vec<ResourceRef>,
    pub columns: Vec<ColumnNode>,
    pub options: GridOptions,
    pub exclude: Option<RowExclusion>,
}

impl GridSpec {
    pub fn new(
        mount_id: impl Into<String>,
        resources: &[&str],
        options: GridOptions,
        columns: Vec<ColumnNode>,
    ) -> Self {
        Self {
            mount_id: mount_id.into(),
            resources: resources.iter().map(|r| ResourceRef::new(*r)).collect(),
            columns,
            options,
            exclude: None,
        }
    }

    pub fn excluding(mut self, exclusion: RowExclusion) -> Self {
        self.exclude = Some(exclusion);
        self
    }

    /// Applies the row exclusion and assembles a validated configuration.
    pub fn build_config(&self, rows: Vec<RowRecord>) -> Result<GridConfig, GridConfigError> {
        let rows = match &self.exclude {
            Some(exclusion) => exclusion.apply(rows),
            None => rows,
        };
        let config = GridConfig::new(self.options.clone(), self.columns.clone(), rows);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageSpec {
    pub id: String,
    pub title: String,
    pub grids: Vec<GridSpec>,
}

impl PageSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, grids: Vec<GridSpec>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            grids,
        }
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceRef> {
        self.grids.iter().flat_map(|g| g.resources.iter())
    }

    pub fn mount_ids(&self) -> impl Iterator<Item = &str> {
        self.grids.iter().map(|g| g.mount_id.as_str())
    }
}

/// Teams whose detail page is implemented, with the page shown for each.
const TEAM_PAGES: &[(&str, fn() -> PageSpec)] = &[("TOR", team::tor_game_log)];

pub fn catalog() -> Vec<PageSpec> {
    vec![
        team::tor_game_log(),
        team::tor_roster(),
        player::mitch_game_log(),
        player::mitch_goal_log(),
        player::mitch_splits(),
    ]
}

pub fn find(id: &str) -> Option<PageSpec> {
    let id = id.trim().trim_matches('/');
    catalog().into_iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

/// Detail page for a team code, matched case-insensitively.
pub fn team_page(code: &str) -> Option<PageSpec> {
    TEAM_PAGES
        .iter()
        .find(|(team, _)| team.eq_ignore_ascii_case(code.trim()))
        .map(|(_, page)| page())
}

pub fn implemented_teams() -> Vec<&'static str> {
    TEAM_PAGES.iter().map(|(team, _)| *team).collect()
}
