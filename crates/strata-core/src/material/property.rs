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

//! Material properties: an identifier, a usage tag, and a typed value.

use super::{MaterialPropertyId, TextureAssetId};

/// How a material property is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialPropertyUsage {
    /// Unknown usage.
    Unknown,
    /// Static value, never touched at runtime.
    Static,
    /// Value written into a shader uniform buffer.
    ShaderUniform,
    /// Value selecting a shader combination.
    ShaderCombination,
    /// Part of the rasterizer state.
    RasterizerState,
    /// Part of the depth stencil state.
    DepthStencilState,
    /// Part of the blend state.
    BlendState,
    /// Part of a sampler state.
    SamplerState,
    /// References a texture asset.
    TextureReference,
    /// References a global material property.
    GlobalReference,
    /// References a property of unknown origin.
    UnknownReference,
    /// References pass data.
    PassReference,
    /// References another material property.
    MaterialReference,
    /// References per-instance data computed by the render queue or a callback.
    InstanceReference,
}

impl MaterialPropertyUsage {
    /// Returns `true` for usages whose value is looked up elsewhere.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            MaterialPropertyUsage::GlobalReference
                | MaterialPropertyUsage::UnknownReference
                | MaterialPropertyUsage::PassReference
                | MaterialPropertyUsage::MaterialReference
                | MaterialPropertyUsage::InstanceReference
        )
    }
}

/// The type of a [`MaterialPropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialPropertyValueType {
    /// `bool`, stored as a 32-bit integer on the GPU.
    Boolean,
    /// `i32`.
    Integer,
    /// `[i32; 2]`.
    Integer2,
    /// `[i32; 3]`.
    Integer3,
    /// `[i32; 4]`.
    Integer4,
    /// `f32`.
    Float,
    /// `[f32; 2]`.
    Float2,
    /// `[f32; 3]`.
    Float3,
    /// `[f32; 4]`.
    Float4,
    /// `[f32; 9]`.
    Float3x3,
    /// `[f32; 16]`.
    Float4x4,
    /// A texture asset identifier.
    TextureAssetId,
    /// The identifier of a global material property.
    GlobalMaterialPropertyId,
}

impl MaterialPropertyValueType {
    /// The number of bytes a value of this type occupies in GPU memory.
    pub const fn number_of_bytes(self) -> u32 {
        match self {
            Self::Boolean | Self::Integer | Self::Float => 4,
            Self::TextureAssetId | Self::GlobalMaterialPropertyId => 4,
            Self::Integer2 | Self::Float2 => 8,
            Self::Integer3 | Self::Float3 => 12,
            Self::Integer4 | Self::Float4 => 16,
            Self::Float3x3 => 36,
            Self::Float4x4 => 64,
        }
    }
}

/// A typed material property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialPropertyValue {
    /// See [`MaterialPropertyValueType::Boolean`].
    Boolean(bool),
    /// See [`MaterialPropertyValueType::Integer`].
    Integer(i32),
    /// See [`MaterialPropertyValueType::Integer2`].
    Integer2([i32; 2]),
    /// See [`MaterialPropertyValueType::Integer3`].
    Integer3([i32; 3]),
    /// See [`MaterialPropertyValueType::Integer4`].
    Integer4([i32; 4]),
    /// See [`MaterialPropertyValueType::Float`].
    Float(f32),
    /// See [`MaterialPropertyValueType::Float2`].
    Float2([f32; 2]),
    /// See [`MaterialPropertyValueType::Float3`].
    Float3([f32; 3]),
    /// See [`MaterialPropertyValueType::Float4`].
    Float4([f32; 4]),
    /// See [`MaterialPropertyValueType::Float3x3`].
    Float3x3([f32; 9]),
    /// See [`MaterialPropertyValueType::Float4x4`].
    Float4x4([f32; 16]),
    /// See [`MaterialPropertyValueType::TextureAssetId`].
    TextureAssetId(TextureAssetId),
    /// See [`MaterialPropertyValueType::GlobalMaterialPropertyId`].
    GlobalMaterialPropertyId(MaterialPropertyId),
}

impl MaterialPropertyValue {
    /// The type of this value.
    pub fn value_type(&self) -> MaterialPropertyValueType {
        match self {
            Self::Boolean(_) => MaterialPropertyValueType::Boolean,
            Self::Integer(_) => MaterialPropertyValueType::Integer,
            Self::Integer2(_) => MaterialPropertyValueType::Integer2,
            Self::Integer3(_) => MaterialPropertyValueType::Integer3,
            Self::Integer4(_) => MaterialPropertyValueType::Integer4,
            Self::Float(_) => MaterialPropertyValueType::Float,
            Self::Float2(_) => MaterialPropertyValueType::Float2,
            Self::Float3(_) => MaterialPropertyValueType::Float3,
            Self::Float4(_) => MaterialPropertyValueType::Float4,
            Self::Float3x3(_) => MaterialPropertyValueType::Float3x3,
            Self::Float4x4(_) => MaterialPropertyValueType::Float4x4,
            Self::TextureAssetId(_) => MaterialPropertyValueType::TextureAssetId,
            Self::GlobalMaterialPropertyId(_) => MaterialPropertyValueType::GlobalMaterialPropertyId,
        }
    }

    /// The number of bytes this value occupies in GPU memory.
    pub fn number_of_bytes(&self) -> u32 {
        self.value_type().number_of_bytes()
    }

    /// Copies the GPU representation of this value into the front of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than [`number_of_bytes`](Self::number_of_bytes).
    pub fn write_bytes(&self, out: &mut [u8]) {
        let bytes: &[u8] = match self {
            Self::Boolean(value) => return write_u32(out, u32::from(*value)),
            Self::TextureAssetId(id) => return write_u32(out, id.0),
            Self::GlobalMaterialPropertyId(id) => return write_u32(out, id.0),
            Self::Integer(value) => bytemuck::bytes_of(value),
            Self::Integer2(value) => bytemuck::bytes_of(value),
            Self::Integer3(value) => bytemuck::bytes_of(value),
            Self::Integer4(value) => bytemuck::bytes_of(value),
            Self::Float(value) => bytemuck::bytes_of(value),
            Self::Float2(value) => bytemuck::bytes_of(value),
            Self::Float3(value) => bytemuck::bytes_of(value),
            Self::Float4(value) => bytemuck::bytes_of(value),
            Self::Float3x3(value) => bytemuck::bytes_of(value),
            Self::Float4x4(value) => bytemuck::bytes_of(value),
        };
        out[..bytes.len()].copy_from_slice(bytes);
    }

    /// The value as a shader combination integer.
    ///
    /// Only booleans and integers select shader combinations.
    pub fn as_shader_combination_value(&self) -> Option<i32> {
        match *self {
            Self::Boolean(value) => Some(i32::from(value)),
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match *self {
            Self::Boolean(value) => Some(value),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_integer(&self) -> Option<i32> {
        match *self {
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// The integer triple payload, if this is an integer triple.
    pub fn as_integer3(&self) -> Option<[i32; 3]> {
        match *self {
            Self::Integer3(value) => Some(value),
            _ => None,
        }
    }

    /// The texture asset payload, if this is a texture asset identifier.
    pub fn as_texture_asset_id(&self) -> Option<TextureAssetId> {
        match *self {
            Self::TextureAssetId(value) => Some(value),
            _ => None,
        }
    }
}

fn write_u32(out: &mut [u8], value: u32) {
    out[..4].copy_from_slice(&value.to_ne_bytes());
}

/// One entry of a material property table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperty {
    id: MaterialPropertyId,
    usage: MaterialPropertyUsage,
    value: MaterialPropertyValue,
    reference: Option<MaterialPropertyId>,
}

impl MaterialProperty {
    /// Creates a property holding `value`.
    pub fn new(
        id: MaterialPropertyId,
        usage: MaterialPropertyUsage,
        value: MaterialPropertyValue,
    ) -> Self {
        Self {
            id,
            usage,
            value,
            reference: None,
        }
    }

    /// Creates a reference property.
    ///
    /// `value` only carries the type (and thus the size) of the referenced data;
    /// `reference` names the property the data is looked up from.
    ///
    /// # Panics
    ///
    /// Panics if `usage` is not a reference usage.
    pub fn new_reference(
        id: MaterialPropertyId,
        usage: MaterialPropertyUsage,
        value: MaterialPropertyValue,
        reference: MaterialPropertyId,
    ) -> Self {
        assert!(
            usage.is_reference(),
            "Material property {id:?}: usage {usage:?} is not a reference usage"
        );
        Self {
            id,
            usage,
            value,
            reference: Some(reference),
        }
    }

    /// The property identifier.
    pub fn id(&self) -> MaterialPropertyId {
        self.id
    }

    /// The usage tag.
    pub fn usage(&self) -> MaterialPropertyUsage {
        self.usage
    }

    /// The value, or the type placeholder of a reference property.
    pub fn value(&self) -> &MaterialPropertyValue {
        &self.value
    }

    /// Replaces the value.
    pub fn set_value(&mut self, value: MaterialPropertyValue) {
        self.value = value;
    }

    /// The referenced property, for reference usages.
    ///
    /// A reference property created without an explicit target references its own id.
    pub fn reference_value(&self) -> Option<MaterialPropertyId> {
        if self.usage.is_reference() {
            Some(self.reference.unwrap_or(self.id))
        } else {
            None
        }
    }
}
