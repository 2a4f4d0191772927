//! In-memory vehicle profile store using DashMap.

use dashmap::DashMap;
use rvnav_core::models::VehicleProfile;
use rvnav_core::traits::VehicleStore;
use std::sync::RwLock;

/// Thread-safe store of vehicle profiles with one selected vehicle.
#[derive(Default)]
pub struct InMemoryVehicleStore {
    vehicles: DashMap<String, VehicleProfile>,
    selected: RwLock<Option<String>>,
}

impl InMemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vehicle. The first vehicle added becomes selected.
    pub fn upsert(&self, vehicle: VehicleProfile) {
        let id = vehicle.id.clone();
        self.vehicles.insert(id.clone(), vehicle);
        if let Ok(mut selected) = self.selected.write() {
            if selected.is_none() {
                *selected = Some(id);
            }
        }
    }

    pub fn remove(&self, id: &str) -> Option<VehicleProfile> {
        let removed = self.vehicles.remove(id).map(|(_, v)| v);
        if let Ok(mut selected) = self.selected.write() {
            if selected.as_deref() == Some(id) {
                *selected = None;
            }
        }
        removed
    }

    /// Select a vehicle by id. Returns false if the id is unknown.
    pub fn select(&self, id: &str) -> bool {
        if !self.vehicles.contains_key(id) {
            return false;
        }
        match self.selected.write() {
            Ok(mut selected) => {
                *selected = Some(id.to_string());
                true
            }
            Err(_) => false,
        }
    }
}

impl VehicleStore for InMemoryVehicleStore {
    fn vehicles(&self) -> Vec<VehicleProfile> {
        let mut all: Vec<VehicleProfile> =
            self.vehicles.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        all
    }

    fn selected_vehicle(&self) -> Option<VehicleProfile> {
        let selected = self.selected.read().ok()?;
        let id = selected.as_deref()?;
        self.vehicles.get(id).map(|r| r.value().clone())
    }
}
