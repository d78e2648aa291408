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

//! The material property model shared by materials, blueprints and the render queue.
//!
//! Materials and blueprints both carry a [`MaterialProperties`] table. The render
//! queue reads it to gather shader combinations, to pack instance data, and to find
//! compute dispatch sizes. Property identifiers are hashed names ([`StringId`]).

pub mod builtin;
mod properties;
mod property;
mod shader_properties;

pub use self::properties::MaterialProperties;
pub use self::property::{
    MaterialProperty, MaterialPropertyUsage, MaterialPropertyValue, MaterialPropertyValueType,
};
pub use self::shader_properties::ShaderProperties;

use crate::utils::string_id::StringId;

/// Identifies a material property by hashed name.
pub type MaterialPropertyId = StringId;
/// Identifies a material technique ("Default", "Shadow", ...) by hashed name.
pub type MaterialTechniqueId = StringId;
/// Identifies a shader property by hashed name.
pub type ShaderPropertyId = StringId;

/// Identifies a material resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialResourceId(pub u32);

/// Identifies a material blueprint resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialBlueprintId(pub u32);

/// Identifies a skeleton resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkeletonResourceId(pub u32);

/// Identifies a texture asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureAssetId(pub u32);

/// The loading state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadingState {
    /// Not loaded.
    #[default]
    Unloaded,
    /// Loading is in progress.
    Loading,
    /// Loaded and usable.
    Loaded,
    /// Loading failed.
    Failed,
}
