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

use crate::material::{SkeletonResourceId, TextureAssetId};
use crate::renderer::api::TextureDimensions;

/// Read-only access to skeleton bone data.
pub trait SkeletonProvider {
    /// The flat bone-space matrix buffer of a skeleton, consumed as-is.
    fn bone_space_data(&self, skeleton: SkeletonResourceId) -> Option<&[u8]>;
}

/// Read-only access to texture shapes.
pub trait TextureProvider {
    /// The dimensions of a loaded texture.
    fn texture_dimensions(&self, texture: TextureAssetId) -> Option<TextureDimensions>;
}
