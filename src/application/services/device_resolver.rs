use crate::application::ports::AccelerationProbe;
use crate::domain::ComputeDevice;

/// Maps a device request (`auto`, `cpu`, `cuda`, any case) to a concrete
/// device. Explicit choices are honored without checking availability; an
/// empty or unrecognized request is `auto`.
pub fn resolve_device(requested: &str, probe: &dyn AccelerationProbe) -> ComputeDevice {
    match requested.trim().to_lowercase().as_str() {
        "cpu" => ComputeDevice::Cpu,
        "cuda" => ComputeDevice::Cuda,
        _ => match probe.cuda_available() {
            Some(true) => ComputeDevice::Cuda,
            Some(false) | None => ComputeDevice::Cpu,
        },
    }
}
