use std::fmt;

use super::compute_device::ComputeDevice;

/// Identifies which weights are resident in an adapter: (model id, device).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub model_id: String,
    pub device: ComputeDevice,
}

impl LoadKey {
    pub fn new(model_id: impl Into<String>, device: ComputeDevice) -> Self {
        Self {
            model_id: model_id.into(),
            device,
        }
    }
}

impl fmt::Display for LoadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.model_id, self.device)
    }
}
