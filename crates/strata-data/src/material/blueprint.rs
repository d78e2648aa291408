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

use strata_core::material::{
    LoadingState, MaterialBlueprintId, MaterialProperties, MaterialProperty, MaterialPropertyId,
    MaterialPropertyUsage, MaterialPropertyValue, ShaderProperties,
};
use strata_core::renderer::{
    CommandBuffer, Command, CompositorContextData, PassBufferManager, PipelineKind,
    PipelineStateCacheManager, ResourceGroupBinding,
};

/// Which instance buffer manager packs the per-instance data of a blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceBufferKind {
    /// All instance data lives in a uniform buffer.
    Uniform,
    /// Indices live in a uniform buffer, transforms and bones in a texture buffer.
    Texture,
}

/// Layout of the per-instance data a blueprint's shaders read.
#[derive(Debug, Clone)]
pub struct InstanceBufferDescriptor {
    /// The packing manager.
    pub kind: InstanceBufferKind,
    /// Root parameter the instance resource group is bound at.
    pub root_parameter_index: u32,
    /// The per-instance element properties, in declaration order.
    pub element_properties: Vec<MaterialProperty>,
}

/// A material blueprint: the shader combination space, the pipeline state cache,
/// and the buffers shared by every material built from it.
#[derive(Debug)]
pub struct MaterialBlueprintResource {
    id: MaterialBlueprintId,
    loading_state: LoadingState,
    pipeline_kind: PipelineKind,
    properties: MaterialProperties,
    shader_combination_generation_counter: u32,
    pipeline_state_cache_manager: Box<dyn PipelineStateCacheManager>,
    instance_buffer: Option<InstanceBufferDescriptor>,
    resource_groups: Vec<ResourceGroupBinding>,
    pass_buffer_manager: Option<Box<dyn PassBufferManager>>,
}

impl MaterialBlueprintResource {
    /// Creates a loaded blueprint. The ID is assigned by the
    /// [`MaterialBlueprintResourceManager`](super::MaterialBlueprintResourceManager).
    pub fn new(
        pipeline_kind: PipelineKind,
        properties: MaterialProperties,
        pipeline_state_cache_manager: Box<dyn PipelineStateCacheManager>,
    ) -> Self {
        Self {
            id: MaterialBlueprintId(u32::MAX),
            loading_state: LoadingState::Loaded,
            pipeline_kind,
            properties,
            shader_combination_generation_counter: 0,
            pipeline_state_cache_manager,
            instance_buffer: None,
            resource_groups: Vec::new(),
            pass_buffer_manager: None,
        }
    }

    /// Declares the per-instance data layout.
    pub fn with_instance_buffer(mut self, instance_buffer: InstanceBufferDescriptor) -> Self {
        self.instance_buffer = Some(instance_buffer);
        self
    }

    /// Adds a resource group (global or light buffer) bound on every blueprint switch.
    pub fn with_resource_group(mut self, binding: ResourceGroupBinding) -> Self {
        self.resource_groups.push(binding);
        self
    }

    /// Sets the pass data manager.
    pub fn with_pass_buffer_manager(mut self, manager: Box<dyn PassBufferManager>) -> Self {
        self.pass_buffer_manager = Some(manager);
        self
    }

    pub(crate) fn set_id(&mut self, id: MaterialBlueprintId) {
        self.id = id;
    }

    pub fn id(&self) -> MaterialBlueprintId {
        self.id
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading_state
    }

    pub fn set_loading_state(&mut self, loading_state: LoadingState) {
        self.loading_state = loading_state;
    }

    pub fn is_loaded(&self) -> bool {
        self.loading_state == LoadingState::Loaded
    }

    pub fn pipeline_kind(&self) -> PipelineKind {
        self.pipeline_kind
    }

    pub fn properties(&self) -> &MaterialProperties {
        &self.properties
    }

    /// Sets a property value, bumping the generation counter for shader-combination properties.
    pub fn set_property_value(
        &mut self,
        id: MaterialPropertyId,
        value: MaterialPropertyValue,
        usage: MaterialPropertyUsage,
    ) -> bool {
        if !self.properties.set_property_value(id, value, usage) {
            return false;
        }
        if self.properties.property_by_id(id).map(MaterialProperty::usage)
            == Some(MaterialPropertyUsage::ShaderCombination)
        {
            self.shader_combination_generation_counter =
                self.shader_combination_generation_counter.wrapping_add(1);
        }
        true
    }

    pub fn shader_combination_generation_counter(&self) -> u32 {
        self.shader_combination_generation_counter
    }

    pub fn pipeline_state_cache_manager(&self) -> &dyn PipelineStateCacheManager {
        self.pipeline_state_cache_manager.as_ref()
    }

    pub fn instance_buffer(&self) -> Option<&InstanceBufferDescriptor> {
        self.instance_buffer.as_ref()
    }

    pub fn resource_groups(&self) -> &[ResourceGroupBinding] {
        &self.resource_groups
    }

    pub fn pass_buffer_manager(&self) -> Option<&dyn PassBufferManager> {
        self.pass_buffer_manager.as_deref()
    }

    pub fn pass_buffer_manager_mut(&mut self) -> Option<&mut (dyn PassBufferManager + 'static)> {
        self.pass_buffer_manager.as_deref_mut()
    }

    /// Reduces shader properties to the combination space of this blueprint.
    ///
    /// Properties the blueprint does not declare as shader-combination properties
    /// are dropped, as are zero values, which select the default combination.
    pub fn optimize_shader_properties(&self, shader_properties: &mut ShaderProperties) {
        shader_properties.retain(|id, value| {
            value != 0
                && self
                    .properties
                    .property_by_id(id)
                    .is_some_and(|property| {
                        property.usage() == MaterialPropertyUsage::ShaderCombination
                    })
        });
    }

    /// Binds the blueprint's fixed resource groups for graphics work.
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

    /// Binds the blueprint's fixed resource groups for compute work.
    pub fn fill_compute_command_buffer(&self, command_buffer: &mut CommandBuffer) {
        for binding in &self.resource_groups {
            command_buffer.push(Command::SetComputeResourceGroup {
                root_parameter_index: binding.root_parameter_index,
                resource_group: binding.resource_group,
            });
        }
    }
}
