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

//! Per-frame state shared by the render queues of one compositor workspace.

use crate::material::MaterialBlueprintId;
use crate::renderer::api::{Command, CommandBuffer, ResourceGroupId};
use glam::DVec3;
use smallvec::SmallVec;

/// Per-frame data of one compositor context, passed explicitly to every render queue.
///
/// Besides the camera data, it remembers which material blueprint is currently bound
/// and which resource group sits at each root parameter. Render queues sharing one
/// context skip rebinding a blueprint that an earlier queue already bound, so they
/// must be filled from one thread in a defined order.
#[derive(Debug, Clone, Default)]
pub struct CompositorContextData {
    camera_world_position: DVec3,
    single_pass_stereo_instancing: bool,
    currently_bound_material_blueprint: Option<MaterialBlueprintId>,
    bound_graphics_resource_groups: SmallVec<[Option<ResourceGroupId>; 8]>,
}

impl CompositorContextData {
    /// Creates the context for one camera.
    pub fn new(camera_world_position: DVec3, single_pass_stereo_instancing: bool) -> Self {
        Self {
            camera_world_position,
            single_pass_stereo_instancing,
            ..Default::default()
        }
    }

    /// The 64-bit world position of the camera.
    pub fn camera_world_position(&self) -> DVec3 {
        self.camera_world_position
    }

    /// Sets the 64-bit world position of the camera.
    pub fn set_camera_world_position(&mut self, position: DVec3) {
        self.camera_world_position = position;
    }

    /// Whether both eyes are rendered in one pass through instancing.
    pub fn single_pass_stereo_instancing(&self) -> bool {
        self.single_pass_stereo_instancing
    }

    /// The material blueprint whose buffers are currently bound, if any.
    pub fn currently_bound_material_blueprint(&self) -> Option<MaterialBlueprintId> {
        self.currently_bound_material_blueprint
    }

    /// Records a blueprint switch.
    ///
    /// The root parameter layout belongs to the blueprint, so the cached
    /// resource group bindings are dropped as well.
    pub fn set_currently_bound_material_blueprint(&mut self, blueprint: Option<MaterialBlueprintId>) {
        self.currently_bound_material_blueprint = blueprint;
        self.invalidate_resource_group_cache();
    }

    /// Forgets all cached resource group bindings.
    pub fn invalidate_resource_group_cache(&mut self) {
        self.bound_graphics_resource_groups.clear();
    }

    /// Records a graphics resource group binding unless the same group is
    /// already bound at `root_parameter_index`.
    ///
    /// Returns `true` if a command was recorded.
    pub fn set_graphics_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: ResourceGroupId,
        command_buffer: &mut CommandBuffer,
    ) -> bool {
        let index = root_parameter_index as usize;
        if self.bound_graphics_resource_groups.len() <= index {
            self.bound_graphics_resource_groups.resize(index + 1, None);
        }
        if self.bound_graphics_resource_groups[index] == Some(resource_group) {
            return false;
        }
        self.bound_graphics_resource_groups[index] = Some(resource_group);
        command_buffer.push(Command::SetGraphicsResourceGroup {
            root_parameter_index,
            resource_group,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_binding_is_cached_per_root_parameter() {
        let mut context = CompositorContextData::default();
        let mut command_buffer = CommandBuffer::new();

        assert!(context.set_graphics_resource_group(2, ResourceGroupId(7), &mut command_buffer));
        assert!(!context.set_graphics_resource_group(2, ResourceGroupId(7), &mut command_buffer));
        assert!(context.set_graphics_resource_group(0, ResourceGroupId(7), &mut command_buffer));
        assert_eq!(command_buffer.len(), 2);
    }

    #[test]
    fn test_blueprint_switch_invalidates_bindings() {
        let mut context = CompositorContextData::default();
        let mut command_buffer = CommandBuffer::new();
        context.set_graphics_resource_group(1, ResourceGroupId(3), &mut command_buffer);

        context.set_currently_bound_material_blueprint(Some(MaterialBlueprintId(4)));

        assert_eq!(
            context.currently_bound_material_blueprint(),
            Some(MaterialBlueprintId(4))
        );
        assert!(context.set_graphics_resource_group(1, ResourceGroupId(3), &mut command_buffer));
        assert_eq!(command_buffer.len(), 2);
    }
}
