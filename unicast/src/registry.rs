//! In-memory registry of discovered casting devices.
//!
//! Keyed by `DeviceId`; re-discovery of a known id replaces the stored
//! descriptor instead of duplicating it. Insertion order is preserved
//! because every tie-break in the selection algorithm is "first in
//! registry order".

use std::collections::HashMap;

use crate::DeviceId;
use crate::model::CastDevice;

/// Ce qu'un `upsert` a réellement changé. `Unchanged` permet à
/// l'appelant de ne pas réémettre `deviceDiscovered` pour un
/// descripteur identique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceId, CastDevice>,
    // Ids dans l'ordre de première insertion; jamais de doublon.
    order: Vec<DeviceId>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insère ou remplace le descripteur par `id`.
    pub fn upsert(&mut self, device: CastDevice) -> UpsertOutcome {
        match self.devices.get(&device.id) {
            Some(existing) if *existing == device => UpsertOutcome::Unchanged,
            Some(_) => {
                self.devices.insert(device.id.clone(), device);
                UpsertOutcome::Updated
            }
            None => {
                self.order.push(device.id.clone());
                self.devices.insert(device.id.clone(), device);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Supprime si présent; silencieux sinon.
    pub fn remove(&mut self, id: &DeviceId) -> Option<CastDevice> {
        let removed = self.devices.remove(id);
        if removed.is_some() {
            self.order.retain(|known| known != id);
        }
        removed
    }

    pub fn get(&self, id: &DeviceId) -> Option<&CastDevice> {
        self.devices.get(id)
    }

    /// Appareils disponibles, dans l'ordre d'insertion. Relit l'état
    /// courant à chaque appel, ce n'est pas un snapshot.
    pub fn list_available(&self) -> impl Iterator<Item = &CastDevice> {
        self.order
            .iter()
            .filter_map(|id| self.devices.get(id))
            .filter(|device| device.is_available)
    }

    /// Tous les appareils connus, disponibles ou non, ordre d'insertion.
    pub fn list_all(&self) -> impl Iterator<Item = &CastDevice> {
        self.order.iter().filter_map(|id| self.devices.get(id))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
