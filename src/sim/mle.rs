//! Simulated mesh (MLE) layer, backed by the shared stack state.

use wpan_config::SharedConfig;

use crate::entities::MeshLayer;

pub struct SimMeshLayer {
    config: SharedConfig,
}

impl SimMeshLayer {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }
}

impl MeshLayer for SimMeshLayer {
    fn is_disabled(&self) -> bool {
        !self.config.state_read().mesh_active
    }
}
