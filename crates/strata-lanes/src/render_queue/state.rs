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

//! Redundant state change elimination while walking sorted renderables.

use super::{QueuedRenderable, RenderQueueResources};
use crate::buffer::InstanceFill;
use crate::providers::ExternalProviders;
use strata_core::renderer::{
    Command, CommandBuffer, CompositorContextData, GraphicsDevice, GraphicsPipelineStateId,
    PipelineState, ResourceError, VertexArrayId,
};
use strata_data::{MaterialBlueprintResourceManager, MaterialResourceManager};

/// What is bound while one command buffer is filled.
///
/// The bound material blueprint lives in the compositor context instead, so
/// consecutive queues sharing a context skip rebinding it.
#[derive(Debug)]
pub(crate) struct GraphicsStateTracker {
    bound_pipeline_state: Option<GraphicsPipelineStateId>,
    bound_vertex_array: Option<VertexArrayId>,
    pass_buffer_pending: bool,
}

impl GraphicsStateTracker {
    pub(crate) fn new() -> Self {
        Self {
            bound_pipeline_state: None,
            bound_vertex_array: None,
            pass_buffer_pending: true,
        }
    }

    /// Records the state changes and instance data of one renderable into `scratch`.
    ///
    /// Returns the start instance location of the renderable's instance data.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn record(
        &mut self,
        device: &dyn GraphicsDevice,
        queued: &QueuedRenderable,
        resources: &mut RenderQueueResources,
        materials: &MaterialResourceManager,
        blueprints: &mut MaterialBlueprintResourceManager,
        providers: &ExternalProviders<'_>,
        context: &mut CompositorContextData,
        scratch: &mut CommandBuffer,
    ) -> Result<u32, ResourceError> {
        let PipelineState::Graphics(pipeline_state) = queued.pipeline_state else {
            panic!(
                "RenderQueue: {:?} queued for graphics work",
                queued.pipeline_state
            );
        };
        if self.bound_pipeline_state != Some(pipeline_state) {
            scratch.push(Command::SetGraphicsPipelineState(pipeline_state));
            self.bound_pipeline_state = Some(pipeline_state);
        }
        if let Some(vertex_array) = queued.vertex_array {
            if self.bound_vertex_array != Some(vertex_array) {
                scratch.push(Command::SetGraphicsVertexArray(vertex_array));
                self.bound_vertex_array = Some(vertex_array);
            }
        }

        let blueprint_id = queued.material_blueprint_id;
        let blueprint_switched = context.currently_bound_material_blueprint() != Some(blueprint_id);
        {
            let blueprint = blueprints.get_mut(blueprint_id).unwrap_or_else(|| {
                panic!("RenderQueue: unknown material blueprint {:?}", blueprint_id)
            });
            if blueprint_switched {
                context.set_currently_bound_material_blueprint(Some(blueprint_id));
                blueprint.fill_graphics_command_buffer(context, scratch);
            }
            if blueprint_switched || self.pass_buffer_pending {
                if let Some(pass_buffer_manager) = blueprint.pass_buffer_manager_mut() {
                    pass_buffer_manager.fill_buffer(device, context)?;
                    pass_buffer_manager.fill_graphics_command_buffer(scratch);
                }
                self.pass_buffer_pending = false;
            }
        }

        let blueprints = &*blueprints;
        let (material, technique) = queued.material_and_technique(materials);
        let fill = InstanceFill {
            blueprint: blueprints.get(blueprint_id).unwrap_or_else(|| {
                panic!("RenderQueue: unknown material blueprint {:?}", blueprint_id)
            }),
            global_material_properties: blueprints.global_material_properties(),
            technique,
            transform: &queued.transform,
            skeleton: queued.skeleton,
            providers,
        };
        debug_assert_eq!(material.id(), queued.material_resource_id);
        if blueprint_switched {
            resources.startup_instance_buffer_filling(device, &fill, context, scratch)?;
        }
        technique.fill_graphics_command_buffer(context, scratch);
        resources.fill_instance_buffer(device, &fill, context, scratch)
    }
}
