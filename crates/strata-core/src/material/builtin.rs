// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Well-known property identifiers the render queue interprets itself.

use super::MaterialPropertyId;

/// Integer property: the render queue index (0 to 255) of a material.
pub const RENDER_QUEUE_INDEX: MaterialPropertyId = MaterialPropertyId::new("RenderQueueIndex");
/// Boolean property: whether renderables using the material cast shadows.
pub const CAST_SHADOWS: MaterialPropertyId = MaterialPropertyId::new("CastShadows");
/// Shader property: set when the renderable is skinned on the GPU.
pub const USE_GPU_SKINNING: MaterialPropertyId = MaterialPropertyId::new("UseGpuSkinning");
/// Shader property: set when both eyes are rendered through instancing.
pub const SINGLE_PASS_STEREO_INSTANCING: MaterialPropertyId =
    MaterialPropertyId::new("SinglePassStereoInstancing");
/// Integer3 property: work group size of a compute material.
pub const LOCAL_COMPUTE_SIZE: MaterialPropertyId = MaterialPropertyId::new("LocalComputeSize");
/// Integer3 or texture property: total work size of a compute material.
pub const GLOBAL_COMPUTE_SIZE: MaterialPropertyId = MaterialPropertyId::new("GlobalComputeSize");
/// Instance reference (uniform instance buffer): camera-relative position in xyz,
/// assigned material slot in w.
pub const WORLD_POSITION_MATERIAL_INDEX_ARRAY: MaterialPropertyId =
    MaterialPropertyId::new("WorldPositionMaterialIndexArray");
/// Instance reference (texture instance buffer): texture buffer start index in x,
/// assigned material slot in y, custom parameter in z.
pub const INSTANCE_INDICES_ARRAY: MaterialPropertyId =
    MaterialPropertyId::new("InstanceIndicesArray");
