use serde::{Deserialize, Serialize};

/// Which Burn backend runs the model.
///
/// `Wgpu` uses the GPU through WebGPU (Vulkan / Metal / DX12);
/// `NdArray` runs on the CPU and needs no graphics driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeBackend {
    #[default]
    Wgpu,
    NdArray,
}

pub type WgpuBackend    = burn::backend::Wgpu;
pub type NdArrayBackend = burn::backend::NdArray;
