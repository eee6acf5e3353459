use crate::error::{PipelineError, Result};
use candle_core::Device;
use serde::{Deserialize, Serialize};

/// Which device a pipeline builder should load its model onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRequest {
    /// Run on the CPU (default).
    #[default]
    Cpu,
    /// Run on the CUDA GPU with this index.
    Cuda(usize),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}

macro_rules! impl_device_methods {
    ($builder:ident) => {
        impl $builder {
            /// Use CPU for inference (default).
            pub fn cpu(mut self) -> Self {
                self.device_request = crate::pipelines::utils::DeviceRequest::Cpu;
                self
            }

            /// Use a specific CUDA GPU for inference.
            pub fn cuda(mut self, index: usize) -> Self {
                self.device_request = crate::pipelines::utils::DeviceRequest::Cuda(index);
                self
            }

            /// Use whatever device the request names.
            pub fn device(mut self, request: crate::pipelines::utils::DeviceRequest) -> Self {
                self.device_request = request;
                self
            }
        }
    };
}

pub(crate) use impl_device_methods;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_request_resolves_to_cpu() {
        let device = DeviceRequest::Cpu.resolve().unwrap();
        assert!(matches!(device, Device::Cpu));
    }

    #[test]
    fn device_request_serde_shape() {
        let cpu: DeviceRequest = serde_json::from_str("\"cpu\"").unwrap();
        assert_eq!(cpu, DeviceRequest::Cpu);

        let cuda: DeviceRequest = serde_json::from_str(r#"{"cuda": 1}"#).unwrap();
        assert_eq!(cuda, DeviceRequest::Cuda(1));
    }
}
