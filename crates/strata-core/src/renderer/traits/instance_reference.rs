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

use crate::material::{MaterialProperty, MaterialPropertyId, SkeletonResourceId};
use crate::renderer::traits::PassBufferManager;
use crate::scene::Transform;
use glam::DVec3;

/// What an instance reference may be resolved against.
pub struct InstanceReferenceContext<'a> {
    /// World transform of the renderable being packed.
    pub transform: &'a Transform,
    /// World position of the camera, for camera-relative values.
    pub camera_world_position: DVec3,
    /// Skeleton of the renderable, if any.
    pub skeleton: Option<SkeletonResourceId>,
    /// Slot of the material inside the material uniform buffer.
    pub assigned_material_slot: u32,
    /// Pass data of the blueprint, if it has any.
    pub pass_buffer_manager: Option<&'a dyn PassBufferManager>,
}

/// Resolves `INSTANCE_REFERENCE` element properties the packers do not know.
pub trait InstanceReferenceResolver {
    /// Writes the value of `reference` into `out`.
    ///
    /// `out` is exactly as large as the value type of `property`. Returns `false`
    /// when the reference is unknown to this resolver.
    fn resolve_instance_reference(
        &self,
        property: &MaterialProperty,
        reference: MaterialPropertyId,
        context: &InstanceReferenceContext<'_>,
        out: &mut [u8],
    ) -> bool;
}
