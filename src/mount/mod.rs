use std::collections::HashMap;

use thiserror::Error;

use crate::grid::GridConfig;

/// Opaque id of a created grid instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridHandle(u64);

impl GridHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("grid container element '#{mount_id}' not found")]
    MissingMount { mount_id: String },

    #[error("grid instance {handle} is not mounted")]
    UnknownHandle { handle: u64 },

    #[error("grid library rejected the configuration: {message}")]
    Rejected { message: String },
}

/// The document plus grid-library surface a page mounts into.
///
/// Mounting is not reentrant; callers hold `&mut` for the whole
/// clear-then-create sequence.
pub trait GridHost {
    fn has_mount(&self, mount_id: &str) -> bool;

    /// Inserts an empty mount element, replacing any element with that id.
    fn create_mount(&mut self, mount_id: &str);

    fn remove_mount(&mut self, mount_id: &str);

    /// Removes whatever is rendered inside the mount element.
    fn clear_mount(&mut self, mount_id: &str);

    fn create_grid(&mut self, mount_id: &str, config: GridConfig) -> Result<GridHandle, MountError>;

    fn size_columns_to_fit(&mut self, handle: GridHandle) -> Result<(), MountError>;

    fn redraw_rows(&mut self, handle: GridHandle) -> Result<(), MountError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct MountedGrid {
    pub handle: GridHandle,
    pub config: GridConfig,
    pub sized_to_fit: bool,
    pub redraws: u32,
}

/// In-memory document: mount elements in insertion order, each holding the
/// grid instances rendered into it.
#[derive(Clone, Debug, Default)]
pub struct StaticDocument {
    order: Vec<String>,
    mounts: HashMap<String, Vec<MountedGrid>>,
    next_handle: u64,
    grids_created: u64,
}

impl StaticDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mounts<I, S>(mount_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut doc = Self::new();
        for id in mount_ids {
            doc.create_mount(id.as_ref());
        }
        doc
    }

    pub fn mount_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn grids(&self, mount_id: &str) -> &[MountedGrid] {
        self.mounts.get(mount_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn grid(&self, handle: GridHandle) -> Option<&MountedGrid> {
        self.mounts
            .values()
            .flat_map(|grids| grids.iter())
            .find(|g| g.handle == handle)
    }

    /// Number of `create_grid` calls over the document's lifetime.
    pub fn grids_created(&self) -> u64 {
        self.grids_created
    }

    fn grid_mut(&mut self, handle: GridHandle) -> Result<&mut MountedGrid, MountError> {
        self.mounts
            .values_mut()
            .flat_map(|grids| grids.iter_mut())
            .find(|g| g.handle == handle)
            .ok_or(MountError::UnknownHandle { handle: handle.0 })
    }
}

impl GridHost for StaticDocument {
    fn has_mount(&self, mount_id: &str) -> bool {
        self.mounts.contains_key(mount_id)
    }

    fn create_mount(&mut self, mount_id: &str) {
        if self.mounts.insert(mount_id.to_string(), Vec::new()).is_none() {
            self.order.push(mount_id.to_string());
        }
    }

    fn remove_mount(&mut self, mount_id: &str) {
        if self.mounts.remove(mount_id).is_some() {
            self.order.retain(|id| id != mount_id);
        }
    }

    fn clear_mount(&mut self, mount_id: &str) {
        if let Some(grids) = self.mounts.get_mut(mount_id) {
            grids.clear();
        }
    }

    fn create_grid(&mut self, mount_id: &str, config: GridConfig) -> Result<GridHandle, MountError> {
        let grids = self
            .mounts
            .get_mut(mount_id)
            .ok_or_else(|| MountError::MissingMount {
                mount_id: mount_id.to_string(),
            })?;
        config.validate().map_err(|e| MountError::Rejected {
            message: e.to_string(),
        })?;
        self.next_handle += 1;
        self.grids_created += 1;
        let handle = GridHandle(self.next_handle);
        grids.push(MountedGrid {
            handle,
            config,
            sized_to_fit: false,
            redraws: 0,
        });
        Ok(handle)
    }

    fn size_columns_to_fit(&mut self, handle: GridHandle) -> Result<(), MountError> {
        self.grid_mut(handle)?.sized_to_fit = true;
        Ok(())
    }

    fn redraw_rows(&mut self, handle: GridHandle) -> Result<(), MountError> {
        self.grid_mut(handle)?.redraws += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ColumnDef, GridOptions};

    fn config() -> GridConfig {
        GridConfig::new(
            GridOptions::default(),
            vec![ColumnDef::text("Opp").into()],
            Vec::new(),
        )
    }

    #[test]
    fn create_grid_requires_mount() {
        let mut doc = StaticDocument::new();
        assert_eq!(
            doc.create_grid("myGrid", config()),
            Err(MountError::MissingMount {
                mount_id: "myGrid".to_string()
            })
        );
        assert_eq!(doc.grids_created(), 0);
    }

    #[test]
    fn recreating_a_mount_drops_its_grids() {
        let mut doc = StaticDocument::with_mounts(["myGrid"]);
        doc.create_grid("myGrid", config()).unwrap();
        doc.create_mount("myGrid");
        assert!(doc.grids("myGrid").is_empty());
        assert_eq!(doc.mount_ids().collect::<Vec<_>>(), vec!["myGrid"]);
    }

    #[test]
    fn invalid_config_is_rejected_without_mounting() {
        let mut doc = StaticDocument::with_mounts(["myGrid"]);
        let bad = GridConfig::new(GridOptions::default(), Vec::new(), Vec::new());
        assert!(matches!(
            doc.create_grid("myGrid", bad),
            Err(MountError::Rejected { .. })
        ));
        assert!(doc.grids("myGrid").is_empty());
        assert_eq!(doc.grids_created(), 0);
    }

    #[test]
    fn sizing_unknown_handle_fails() {
        let mut doc = StaticDocument::with_mounts(["myGrid"]);
        let handle = doc.create_grid("myGrid", config()).unwrap();
        doc.clear_mount("myGrid");
        assert!(doc.size_columns_to_fit(handle).is_err());
    }
}
