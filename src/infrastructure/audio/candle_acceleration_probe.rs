use crate::application::ports::AccelerationProbe;

/// Reports CUDA availability as candle sees it. Without the `cuda` feature
/// this is always `false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CandleAccelerationProbe;

impl AccelerationProbe for CandleAccelerationProbe {
    fn cuda_available(&self) -> Option<bool> {
        Some(candle_core::utils::cuda_is_available())
    }
}
