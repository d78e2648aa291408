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

use strata_core::renderer::{InstanceReferenceResolver, SkeletonProvider, TextureProvider};

/// The read-only collaborators a render queue consults while filling.
///
/// Every provider is optional. A missing provider behaves like one that knows
/// nothing, so a lookup that depends on it fails the way an unknown id would.
#[derive(Clone, Copy, Default)]
pub struct ExternalProviders<'a> {
    /// Bone-space matrices of skinned renderables.
    pub skeletons: Option<&'a dyn SkeletonProvider>,
    /// Dimensions of textures referenced by compute dispatch sizes.
    pub textures: Option<&'a dyn TextureProvider>,
    /// Resolution of instance references the packers do not know.
    pub instance_references: Option<&'a dyn InstanceReferenceResolver>,
}

impl std::fmt::Debug for ExternalProviders<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalProviders")
            .field("skeletons", &self.skeletons.is_some())
            .field("textures", &self.textures.is_some())
            .field("instance_references", &self.instance_references.is_some())
            .finish()
    }
}
