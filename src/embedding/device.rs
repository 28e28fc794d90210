use candle_core::Device;
use tracing::{debug, warn};

/// Picks the compute device for inference.
///
/// GPU backends are only attempted when compiled in (`metal` / `cuda` features);
/// any failure falls back to CPU so scoring keeps working on plain hosts.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            tracing::info!("Using Metal GPU for embeddings");
            return device;
        }
        Err(e) => warn!(error = %e, "Metal device unavailable"),
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            tracing::info!("Using CUDA GPU for embeddings");
            return device;
        }
        Err(e) => warn!(error = %e, "CUDA device unavailable"),
    }

    if cfg!(any(feature = "metal", feature = "cuda")) {
        warn!("Falling back to CPU device");
    } else {
        debug!("No GPU backend compiled, using CPU");
    }

    Device::Cpu
}

/// Short name for a device, used in readiness output.
pub fn device_label(device: &Device) -> &'static str {
    match device {
        Device::Cpu => "cpu",
        Device::Cuda(_) => "cuda",
        Device::Metal(_) => "metal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_label() {
        assert_eq!(device_label(&Device::Cpu), "cpu");
    }

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    #[test]
    fn test_select_device_defaults_to_cpu() {
        assert!(matches!(select_device(), Device::Cpu));
    }
}
