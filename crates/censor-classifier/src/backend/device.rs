//! Device and precision selection for local inference.
//!
//! Only affects speed and memory; results are produced either way.

use candle_core::{DType, Device};
#[cfg(any(feature = "cuda", feature = "metal"))]
use tracing::{debug, info};

/// Best available device and the dtype to load weights in.
pub fn select_device(use_gpu: bool) -> (Device, DType) {
    if !use_gpu {
        return (Device::Cpu, DType::F32);
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("CUDA device available");
                return (device, DType::BF16);
            }
            Err(e) => {
                debug!("CUDA not available: {}, falling back to CPU", e);
            }
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Metal device available");
                return (device, DType::F16);
            }
            Err(e) => {
                debug!("Metal not available: {}, falling back to CPU", e);
            }
        }
    }

    (Device::Cpu, DType::F32)
}
