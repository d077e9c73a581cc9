/// Reports whether a CUDA device can be used by this process.
pub trait AccelerationProbe: Send + Sync {
    /// `None` means the probe itself is unavailable (no runtime, no driver
    /// bindings). Callers treat that the same as "no acceleration".
    fn cuda_available(&self) -> Option<bool>;
}
