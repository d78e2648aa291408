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

use smallvec::SmallVec;
use strata_core::material::{MaterialBlueprintId, MaterialTechniqueId};
use strata_core::renderer::{Command, CommandBuffer, CompositorContextData, ResourceGroupBinding};

/// Binds a material to one named rendering technique and its blueprint.
#[derive(Debug, Clone)]
pub struct MaterialTechnique {
    id: MaterialTechniqueId,
    material_blueprint_id: MaterialBlueprintId,
    assigned_material_slot: u32,
    serialized_pipeline_state_hash: u32,
    resource_groups: SmallVec<[ResourceGroupBinding; 2]>,
}

impl MaterialTechnique {
    pub fn new(id: MaterialTechniqueId, material_blueprint_id: MaterialBlueprintId) -> Self {
        Self {
            id,
            material_blueprint_id,
            assigned_material_slot: 0,
            serialized_pipeline_state_hash: 0,
            resource_groups: SmallVec::new(),
        }
    }

    /// Sets the slot of the material inside the blueprint's material uniform buffer.
    pub fn with_assigned_material_slot(mut self, slot: u32) -> Self {
        self.assigned_material_slot = slot;
        self
    }

    /// Sets the hash of the serialized fixed-function pipeline state.
    pub fn with_serialized_pipeline_state_hash(mut self, hash: u32) -> Self {
        self.serialized_pipeline_state_hash = hash;
        self
    }

    /// Adds a resource group (material uniform buffer, textures, ...) bound for this technique.
    pub fn with_resource_group(mut self, binding: ResourceGroupBinding) -> Self {
        self.resource_groups.push(binding);
        self
    }

    pub fn id(&self) -> MaterialTechniqueId {
        self.id
    }

    pub fn material_blueprint_id(&self) -> MaterialBlueprintId {
        self.material_blueprint_id
    }

    pub fn assigned_material_slot(&self) -> u32 {
        self.assigned_material_slot
    }

    pub fn serialized_pipeline_state_hash(&self) -> u32 {
        self.serialized_pipeline_state_hash
    }

    /// Changing the fixed-function state changes the hash, which in turn
    /// invalidates every renderable cache entry resolved for this technique.
    pub fn set_serialized_pipeline_state_hash(&mut self, hash: u32) {
        self.serialized_pipeline_state_hash = hash;
    }

    pub fn resource_groups(&self) -> &[ResourceGroupBinding] {
        &self.resource_groups
    }

    /// Binds the technique's resource groups, skipping those already bound.
    pub fn fill_graphics_command_buffer(
        &self,
        context: &mut CompositorContextData,
        command_buffer: &mut CommandBuffer,
    ) {
        for binding in &self.resource_groups {
            context.set_graphics_resource_group(
                binding.root_parameter_index,
                binding.resource_group,
                command_buffer,
            );
        }
    }

    /// Binds the technique's resource groups for compute work.
    pub fn fill_compute_command_buffer(&self, command_buffer: &mut CommandBuffer) {
        for binding in &self.resource_groups {
            command_buffer.push(Command::SetComputeResourceGroup {
                root_parameter_index: binding.root_parameter_index,
                resource_group: binding.resource_group,
            });
        }
    }
}
