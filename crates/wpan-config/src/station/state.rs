/// Mutable, stack-editable state (lock-protected).
#[derive(Debug, Clone)]
pub struct StackState {
    /// Whether the mesh layer is up. False means the device is detached and
    /// control-plane operations that need the mesh are refused.
    pub mesh_active: bool,
}

impl Default for StackState {
    fn default() -> Self {
        Self { mesh_active: false }
    }
}
