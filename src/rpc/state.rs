//! Server state management

use indexmap::IndexMap;

use crate::layer::ImportedLayer;

/// In-memory state: imported layers keyed by id, in paste order.
pub struct ServerState {
    layers: IndexMap<u32, ImportedLayer>,
    next_layer_id: u32,
}

impl ServerState {
    pub fn new() -> Self {
        ServerState {
            layers: IndexMap::new(),
            next_layer_id: 1,
        }
    }

    pub fn add_layer(&mut self, layer: ImportedLayer) -> u32 {
        let layer_id = self.next_layer_id;
        self.next_layer_id += 1;
        self.layers.insert(layer_id, layer);
        layer_id
    }

    pub fn layer(&self, layer_id: u32) -> Option<&ImportedLayer> {
        self.layers.get(&layer_id)
    }

    pub fn remove_layer(&mut self, layer_id: u32) -> bool {
        self.layers.shift_remove(&layer_id).is_some()
    }

    pub fn layers(&self) -> impl Iterator<Item = (u32, &ImportedLayer)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
