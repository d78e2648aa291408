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

use super::{MaterialBlueprintResource, MaterialResource};
use strata_core::material::{
    MaterialBlueprintId, MaterialProperties, MaterialPropertyId, MaterialPropertyUsage,
    MaterialPropertyValue, MaterialResourceId,
};

/// Owns every material resource. IDs are indices and stay stable.
#[derive(Debug, Default)]
pub struct MaterialResourceManager {
    resources: Vec<MaterialResource>,
}

impl MaterialResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material and returns its ID.
    pub fn add(&mut self, mut material: MaterialResource) -> MaterialResourceId {
        let id = MaterialResourceId(self.resources.len() as u32);
        material.set_id(id);
        self.resources.push(material);
        log::debug!("MaterialResourceManager: registered material {:?}", id);
        id
    }

    pub fn get(&self, id: MaterialResourceId) -> Option<&MaterialResource> {
        self.resources.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: MaterialResourceId) -> Option<&mut MaterialResource> {
        self.resources.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialResource> {
        self.resources.iter()
    }
}

/// Owns every material blueprint together with the global material properties.
#[derive(Debug, Default)]
pub struct MaterialBlueprintResourceManager {
    resources: Vec<MaterialBlueprintResource>,
    global_material_properties: MaterialProperties,
    global_shader_combination_generation_counter: u32,
}

impl MaterialBlueprintResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blueprint and returns its ID.
    pub fn add(&mut self, mut blueprint: MaterialBlueprintResource) -> MaterialBlueprintId {
        let id = MaterialBlueprintId(self.resources.len() as u32);
        blueprint.set_id(id);
        self.resources.push(blueprint);
        log::debug!("MaterialBlueprintResourceManager: registered blueprint {:?}", id);
        id
    }

    pub fn get(&self, id: MaterialBlueprintId) -> Option<&MaterialBlueprintResource> {
        self.resources.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: MaterialBlueprintId) -> Option<&mut MaterialBlueprintResource> {
        self.resources.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Properties shared by every blueprint, looked up before blueprint properties.
    pub fn global_material_properties(&self) -> &MaterialProperties {
        &self.global_material_properties
    }

    /// Sets a global property value.
    ///
    /// Changing a shader-combination global invalidates every cached pipeline state.
    pub fn set_global_property_value(
        &mut self,
        id: MaterialPropertyId,
        value: MaterialPropertyValue,
        usage: MaterialPropertyUsage,
    ) -> bool {
        if !self
            .global_material_properties
            .set_property_value(id, value, usage)
        {
            return false;
        }
        let usage = self
            .global_material_properties
            .property_by_id(id)
            .map(|property| property.usage());
        if usage == Some(MaterialPropertyUsage::ShaderCombination) {
            self.global_shader_combination_generation_counter = self
                .global_shader_combination_generation_counter
                .wrapping_add(1);
        }
        true
    }

    pub fn global_shader_combination_generation_counter(&self) -> u32 {
        self.global_shader_combination_generation_counter
    }
}
