//! Read-only game data: crops, fertilizers, and the event calendar.

use crate::calendar::CalendarEvent;
use crate::crop::{Crop, CropId};
use crate::fertilizer::{Fertilizer, NO_FERTILIZER_ID};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Crop, fertilizer, and event lookups shared by every planning operation.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    crops: Vec<Arc<Crop>>,
    crops_by_id: BTreeMap<CropId, Arc<Crop>>,
    fertilizers: Vec<Arc<Fertilizer>>,
    fertilizers_by_id: BTreeMap<String, Arc<Fertilizer>>,
    events: BTreeMap<u32, CalendarEvent>,
}

impl Catalog {
    /// Build a catalog. Later duplicates of a crop or fertilizer id are ignored,
    /// and the `none` fertilizer is added when missing.
    pub fn new(
        crops: Vec<Crop>,
        fertilizers: Vec<Fertilizer>,
        events: Vec<CalendarEvent>,
    ) -> Self {
        let mut catalog = Catalog::default();
        for crop in crops {
            if catalog.crops_by_id.contains_key(&crop.id) {
                continue;
            }
            let crop = Arc::new(crop);
            catalog.crops_by_id.insert(crop.id.clone(), Arc::clone(&crop));
            catalog.crops.push(crop);
        }
        if !fertilizers.iter().any(Fertilizer::is_none) {
            catalog.push_fertilizer(Fertilizer::none());
        }
        for fertilizer in fertilizers {
            if !catalog.fertilizers_by_id.contains_key(&fertilizer.id) {
                catalog.push_fertilizer(fertilizer);
            }
        }
        for event in events {
            catalog.events.insert(event.date(), event);
        }
        catalog
    }

    fn push_fertilizer(&mut self, fertilizer: Fertilizer) {
        let fertilizer = Arc::new(fertilizer);
        self.fertilizers_by_id
            .insert(fertilizer.id.clone(), Arc::clone(&fertilizer));
        self.fertilizers.push(fertilizer);
    }

    /// Crops in catalog order.
    pub fn crops(&self) -> &[Arc<Crop>] {
        &self.crops
    }

    pub fn crop(&self, id: &CropId) -> Option<&Arc<Crop>> {
        self.crops_by_id.get(id)
    }

    /// Look a crop up by its raw identifier string.
    pub fn crop_by_str(&self, id: &str) -> Option<&Arc<Crop>> {
        self.crops_by_id.get(&CropId(id.to_string()))
    }

    /// Fertilizers in catalog order, `none` included.
    pub fn fertilizers(&self) -> &[Arc<Fertilizer>] {
        &self.fertilizers
    }

    pub fn fertilizer(&self, id: &str) -> Option<&Arc<Fertilizer>> {
        self.fertilizers_by_id.get(id)
    }

    /// The sentinel `none` fertilizer.
    pub fn no_fertilizer(&self) -> Arc<Fertilizer> {
        self.fertilizers_by_id
            .get(NO_FERTILIZER_ID)
            .cloned()
            .unwrap_or_else(|| Arc::new(Fertilizer::none()))
    }

    /// Resolve an optional persisted id; unknown ids fall back to `none`.
    pub fn fertilizer_or_none(&self, id: Option<&str>) -> Arc<Fertilizer> {
        id.and_then(|id| self.fertilizer(id))
            .cloned()
            .unwrap_or_else(|| self.no_fertilizer())
    }

    /// Events keyed by day of the year.
    pub fn events(&self) -> &BTreeMap<u32, CalendarEvent> {
        &self.events
    }

    pub fn event_on(&self, day: u32) -> Option<&CalendarEvent> {
        self.events.get(&day)
    }
}
