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

//! Growable scratch buffers and the managers writing per-frame data into them.

mod indirect;
mod packing;
mod scratch;
mod texture_instance;
mod uniform_instance;

pub use self::indirect::IndirectBufferManager;
pub use self::packing::{align_up, packed_offset, ElementLayout, PACKAGE_SIZE};
pub use self::scratch::{ScratchBufferKind, ScratchBufferManager, ScratchRegion};
pub use self::texture_instance::{TextureInstanceBufferManager, TRANSFORM_BLOCK_SIZE};
pub use self::uniform_instance::UniformInstanceBufferManager;

use crate::providers::ExternalProviders;
use strata_core::material::{MaterialProperties, SkeletonResourceId};
use strata_core::scene::Transform;
use strata_data::{MaterialBlueprintResource, MaterialTechnique};

/// Everything an instance buffer manager reads to pack one renderable.
#[derive(Clone, Copy)]
pub struct InstanceFill<'a> {
    /// The blueprint declaring the per-instance layout.
    pub blueprint: &'a MaterialBlueprintResource,
    /// Global material properties, consulted before blueprint properties.
    pub global_material_properties: &'a MaterialProperties,
    /// The technique being drawn.
    pub technique: &'a MaterialTechnique,
    /// World transform of the renderable.
    pub transform: &'a Transform,
    /// Skeleton of the renderable, if skinned.
    pub skeleton: Option<SkeletonResourceId>,
    /// Skeleton data and instance reference resolution.
    pub providers: &'a ExternalProviders<'a>,
}
