use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use std::sync::atomic::{AtomicU64, Ordering};

use aidpulse_core::error::{AidPulseError, Result};

use super::panel_task::PanelHandle;
use crate::display::PanelUpdate;

struct PanelEntry {
    handle: PanelHandle,
    created_seq: u64,
}

/// Mounted panels: `panel_id -> running task handle`.
///
/// Removing an entry hands the handle back to the caller; dropping it
/// cancels the task.
pub struct PanelRegistry {
    panels: DashMap<String, PanelEntry>,
    seq: AtomicU64,
}

impl Default for PanelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelRegistry {
    /// Mount sequence numbers start at 1.
    pub fn new() -> Self {
        Self {
            panels: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Insert a panel, spawning it only if the id is free.
    ///
    /// Returns the mount sequence number.
    pub fn insert_with<F>(&self, panel_id: &str, spawn: F) -> Result<u64>
    where
        F: FnOnce() -> PanelHandle,
    {
        match self.panels.entry(panel_id.to_string()) {
            Entry::Occupied(_) => Err(AidPulseError::PanelConflict(panel_id.to_string())),
            Entry::Vacant(v) => {
                let created_seq = self.seq.fetch_add(1, Ordering::Relaxed);
                v.insert(PanelEntry {
                    handle: spawn(),
                    created_seq,
                });
                Ok(created_seq)
            }
        }
    }

    pub fn remove(&self, panel_id: &str) -> Option<PanelHandle> {
        self.panels.remove(panel_id).map(|(_, e)| e.handle)
    }

    pub fn contains(&self, panel_id: &str) -> bool {
        self.panels.contains_key(panel_id)
    }

    pub fn snapshot(&self, panel_id: &str) -> Option<PanelUpdate> {
        self.panels.get(panel_id).map(|e| e.handle.snapshot())
    }

    /// Mounted ids in mount order.
    pub fn panel_ids(&self) -> Vec<String> {
        let mut ids: Vec<(u64, String)> = self
            .panels
            .iter()
            .map(|e| (e.value().created_seq, e.key().clone()))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Remove every panel, returning handles in mount order.
    pub fn drain(&self) -> Vec<PanelHandle> {
        self.panel_ids()
            .into_iter()
            .filter_map(|id| self.remove(&id))
            .collect()
    }
}
