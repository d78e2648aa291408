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

//! The render queue: bucketing, sorting and command emission.
//!
//! A frame runs each queue through `clear` -> `add_renderables_from_renderable_manager`
//! (any number of calls) -> `fill_graphics_command_buffer` or
//! `fill_compute_command_buffer`. Buckets are sorted once, on their first fill;
//! appending to a sorted bucket before the next `clear` is a usage error.

mod batch;
mod compute;
mod resources;
mod state;

pub use self::resources::RenderQueueResources;

use self::batch::IndirectBatcher;
use self::state::GraphicsStateTracker;
use crate::config::RenderQueueDescriptor;
use crate::pipeline::PipelineStateResolver;
use crate::providers::ExternalProviders;
use crate::sorting::{opaque_sorting_key, transparent_sorting_key};
use strata_core::material::{
    MaterialBlueprintId, MaterialResourceId, MaterialTechniqueId, SkeletonResourceId,
};
use strata_core::renderer::{
    Command, CommandBuffer, CompositorContextData, DrawArguments, DrawIndexedArguments,
    DrawSource, GraphicsDevice, PipelineState, ResourceError, VertexArrayId,
};
use strata_core::scene::Transform;
use strata_data::{
    IndirectDrawSource, MaterialBlueprintResourceManager, MaterialResource,
    MaterialResourceManager, MaterialTechnique, RenderableManager,
};

/// A renderable as queued for one frame: a copy of everything the fill needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedRenderable {
    pub vertex_array: Option<VertexArrayId>,
    pub draw_indexed: bool,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
    pub number_of_indices: u32,
    pub instance_count: u32,
    pub indirect: Option<IndirectDrawSource>,
    pub transform: Transform,
    pub skeleton: Option<SkeletonResourceId>,
    pub material_resource_id: MaterialResourceId,
    pub material_technique_id: MaterialTechniqueId,
    pub material_blueprint_id: MaterialBlueprintId,
    pub pipeline_state: PipelineState,
    pub sorting_key: u64,
}

impl QueuedRenderable {
    /// Whether the renderable has neither geometry nor indirect arguments.
    pub fn is_null_draw(&self) -> bool {
        self.indirect.is_none() && self.number_of_indices == 0
    }

    fn material_and_technique<'a>(
        &self,
        materials: &'a MaterialResourceManager,
    ) -> (&'a MaterialResource, &'a MaterialTechnique) {
        let material = materials
            .get(self.material_resource_id)
            .unwrap_or_else(|| panic!("RenderQueue: unknown material {:?}", self.material_resource_id));
        let technique = material
            .technique_by_id(self.material_technique_id)
            .unwrap_or_else(|| {
                panic!(
                    "RenderQueue: material {:?} lost technique {:?}",
                    self.material_resource_id, self.material_technique_id
                )
            });
        (material, technique)
    }
}

/// One render queue index bucket.
#[derive(Debug, Default)]
struct Queue {
    queued_renderables: Vec<QueuedRenderable>,
    sorted: bool,
}

/// Collects renderables of a render queue index range and turns them into commands.
#[derive(Debug)]
pub struct RenderQueue {
    descriptor: RenderQueueDescriptor,
    queues: Vec<Queue>,
    number_of_null_draw_calls: u32,
    number_of_indexed_draw_calls: u32,
    number_of_non_indexed_draw_calls: u32,
    pipeline_state_resolver: PipelineStateResolver,
    scratch_command_buffer: CommandBuffer,
}

impl RenderQueue {
    /// Creates a queue with one bucket per render queue index of the descriptor's range.
    pub fn new(descriptor: RenderQueueDescriptor) -> Self {
        assert!(
            descriptor.minimum_render_queue_index <= descriptor.maximum_render_queue_index,
            "RenderQueue: render queue index range {}..={} is empty",
            descriptor.minimum_render_queue_index,
            descriptor.maximum_render_queue_index
        );
        let number_of_queues = usize::from(
            descriptor.maximum_render_queue_index - descriptor.minimum_render_queue_index,
        ) + 1;
        let mut queues = Vec::with_capacity(number_of_queues);
        queues.resize_with(number_of_queues, Queue::default);
        Self {
            descriptor,
            queues,
            number_of_null_draw_calls: 0,
            number_of_indexed_draw_calls: 0,
            number_of_non_indexed_draw_calls: 0,
            pipeline_state_resolver: PipelineStateResolver::new(),
            scratch_command_buffer: CommandBuffer::new(),
        }
    }

    pub fn descriptor(&self) -> &RenderQueueDescriptor {
        &self.descriptor
    }

    pub fn number_of_null_draw_calls(&self) -> u32 {
        self.number_of_null_draw_calls
    }

    pub fn number_of_indexed_draw_calls(&self) -> u32 {
        self.number_of_indexed_draw_calls
    }

    pub fn number_of_non_indexed_draw_calls(&self) -> u32 {
        self.number_of_non_indexed_draw_calls
    }

    /// All queued draw calls, null draws included.
    pub fn number_of_draw_calls(&self) -> u32 {
        self.number_of_null_draw_calls
            + self.number_of_indexed_draw_calls
            + self.number_of_non_indexed_draw_calls
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_draw_calls() == 0
    }

    /// The renderables queued at `render_queue_index`, in queue order (sorted
    /// order once the queue was filled).
    pub fn queued_renderables(&self, render_queue_index: u8) -> &[QueuedRenderable] {
        self.queue_slot(render_queue_index)
            .map(|slot| self.queues[slot].queued_renderables.as_slice())
            .unwrap_or(&[])
    }

    /// Empties every bucket. Does nothing on an empty queue.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        for queue in &mut self.queues {
            queue.queued_renderables.clear();
            queue.sorted = false;
        }
        self.number_of_null_draw_calls = 0;
        self.number_of_indexed_draw_calls = 0;
        self.number_of_non_indexed_draw_calls = 0;
    }

    /// Queues the renderables of the selected LOD of `renderable_manager`.
    ///
    /// Renderables are skipped when their render queue index is out of range, when
    /// `cast_shadows` is requested and they do not cast shadows, when their material
    /// lacks `material_technique_id` or its blueprint is not loaded, and when no
    /// pipeline state can be resolved yet.
    ///
    /// # Panics
    ///
    /// Panics if the manager is not visible, or if the target bucket was already sorted.
    pub fn add_renderables_from_renderable_manager(
        &mut self,
        renderable_manager: &mut RenderableManager,
        material_technique_id: MaterialTechniqueId,
        materials: &MaterialResourceManager,
        blueprints: &MaterialBlueprintResourceManager,
        context: &CompositorContextData,
        cast_shadows: bool,
    ) {
        assert!(
            renderable_manager.is_visible(),
            "RenderQueue: renderable manager {:?} is not visible",
            renderable_manager.id()
        );
        let minimum = self.descriptor.minimum_render_queue_index;
        let maximum = self.descriptor.maximum_render_queue_index;
        if (cast_shadows && !renderable_manager.cast_shadows())
            || renderable_manager.maximum_render_queue_index() < minimum
            || renderable_manager.minimum_render_queue_index() > maximum
        {
            return;
        }

        let transform = *renderable_manager.transform();
        let distance_to_camera = renderable_manager.cached_distance_to_camera();
        for renderable in renderable_manager.lod_renderables_mut() {
            if cast_shadows && !renderable.cast_shadows() {
                continue;
            }
            let render_queue_index = renderable.render_queue_index();
            if render_queue_index < minimum || render_queue_index > maximum {
                continue;
            }
            let Some(material) = renderable
                .material_resource_id()
                .and_then(|id| materials.get(id))
            else {
                continue;
            };
            let Some(technique) = material.technique_by_id(material_technique_id) else {
                continue;
            };
            let blueprint_id = technique.material_blueprint_id();
            let Some(blueprint) = blueprints.get(blueprint_id).filter(|blueprint| blueprint.is_loaded())
            else {
                log::trace!(
                    "RenderQueue: blueprint {:?} of material {:?} is not loaded",
                    blueprint_id,
                    material.id()
                );
                continue;
            };
            let Some(pipeline_state) = self.pipeline_state_resolver.resolve(
                renderable,
                material,
                technique,
                blueprint,
                blueprints,
                context,
            ) else {
                continue;
            };

            let vertex_array = if self.descriptor.position_only_pass {
                renderable
                    .position_only_vertex_array()
                    .or(renderable.vertex_array())
            } else {
                renderable.vertex_array()
            };
            let pipeline_state_id = pipeline_state.raw_id() as u64;
            let vertex_array_id = vertex_array.map_or(0, |vertex_array| vertex_array.0 as u64);
            let sorting_key = if self.descriptor.transparent_pass {
                transparent_sorting_key(pipeline_state_id, vertex_array_id, 0, distance_to_camera)
            } else {
                opaque_sorting_key(pipeline_state_id, vertex_array_id, 0, distance_to_camera)
            };

            let queue = &mut self.queues[usize::from(render_queue_index - minimum)];
            assert!(
                !queue.sorted,
                "RenderQueue: render queue index {} appended to after it was sorted",
                render_queue_index
            );
            queue.queued_renderables.push(QueuedRenderable {
                vertex_array,
                draw_indexed: renderable.draw_indexed(),
                start_index_location: renderable.start_index_location(),
                base_vertex_location: renderable.base_vertex_location(),
                number_of_indices: renderable.number_of_indices(),
                instance_count: renderable.instance_count(),
                indirect: renderable.indirect_draw_source(),
                transform,
                skeleton: renderable.skeleton_resource_id(),
                material_resource_id: material.id(),
                material_technique_id,
                material_blueprint_id: blueprint_id,
                pipeline_state,
                sorting_key,
            });

            if renderable.is_null_draw() {
                self.number_of_null_draw_calls += 1;
            } else if renderable.draw_indexed() {
                self.number_of_indexed_draw_calls += 1;
            } else {
                self.number_of_non_indexed_draw_calls += 1;
            }
        }
    }

    /// Emits the graphics commands of every queued renderable into `command_buffer`.
    ///
    /// A queue holding exactly one draw call emits a direct draw. Otherwise the
    /// argument records go into one indirect region reserved for all draws, and
    /// consecutive records are drawn by one multi-draw-indirect command until the
    /// indexedness changes or a state change has to be recorded in between.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_graphics_command_buffer(
        &mut self,
        device: &dyn GraphicsDevice,
        resources: &mut RenderQueueResources,
        materials: &MaterialResourceManager,
        blueprints: &mut MaterialBlueprintResourceManager,
        providers: &ExternalProviders<'_>,
        context: &mut CompositorContextData,
        command_buffer: &mut CommandBuffer,
    ) -> Result<(), ResourceError> {
        let number_of_draw_calls = self.number_of_draw_calls();
        assert!(
            number_of_draw_calls > 0,
            "RenderQueue: filling a command buffer from an empty queue"
        );

        let single_draw = number_of_draw_calls == 1;
        let number_of_batched_draws =
            self.number_of_indexed_draw_calls + self.number_of_non_indexed_draw_calls;
        let region = if single_draw || number_of_batched_draws == 0 {
            None
        } else {
            Some(
                resources
                    .indirect_buffer_manager_mut()
                    .acquire(device, number_of_batched_draws * DrawIndexedArguments::SIZE)?,
            )
        };
        let mut batcher = IndirectBatcher::new(region);
        let mut state = GraphicsStateTracker::new();
        let instance_multiplier = if context.single_pass_stereo_instancing() { 2 } else { 1 };
        let scratch = &mut self.scratch_command_buffer;

        for queue in &mut self.queues {
            if queue.queued_renderables.is_empty() {
                continue;
            }
            if self.descriptor.do_sort && !queue.sorted {
                queue
                    .queued_renderables
                    .sort_by_key(|queued| queued.sorting_key);
            }
            queue.sorted = true;

            for queued in &queue.queued_renderables {
                scratch.clear();
                let start_instance_location = state.record(
                    device, queued, resources, materials, blueprints, providers, context, scratch,
                )?;
                if !scratch.is_empty() {
                    batcher.flush(command_buffer);
                    command_buffer.append(scratch);
                }

                let instance_count = queued.instance_count * instance_multiplier;
                if let Some(indirect) = queued.indirect {
                    batcher.flush(command_buffer);
                    command_buffer.push(if queued.draw_indexed {
                        Command::DrawIndexedGraphics {
                            source: DrawSource::Indirect {
                                buffer: indirect.buffer,
                                offset: indirect.offset,
                            },
                            number_of_draws: indirect.number_of_draws,
                        }
                    } else {
                        Command::DrawGraphics {
                            source: DrawSource::Indirect {
                                buffer: indirect.buffer,
                                offset: indirect.offset,
                            },
                            number_of_draws: indirect.number_of_draws,
                        }
                    });
                } else if queued.is_null_draw() {
                    continue;
                } else if queued.draw_indexed {
                    let arguments = DrawIndexedArguments {
                        index_count_per_instance: queued.number_of_indices,
                        instance_count,
                        start_index_location: queued.start_index_location,
                        base_vertex_location: queued.base_vertex_location,
                        start_instance_location,
                    };
                    if single_draw {
                        command_buffer.push(Command::DrawIndexedGraphics {
                            source: DrawSource::Direct(arguments),
                            number_of_draws: 1,
                        });
                    } else {
                        batcher.push_indexed(device, &arguments, command_buffer)?;
                    }
                } else {
                    let arguments = DrawArguments {
                        vertex_count_per_instance: queued.number_of_indices,
                        instance_count,
                        start_vertex_location: queued.start_index_location,
                        start_instance_location,
                    };
                    if single_draw {
                        command_buffer.push(Command::DrawGraphics {
                            source: DrawSource::Direct(arguments),
                            number_of_draws: 1,
                        });
                    } else {
                        batcher.push_non_indexed(device, &arguments, command_buffer)?;
                    }
                }
            }
        }
        batcher.flush(command_buffer);
        Ok(())
    }

    fn queue_slot(&self, render_queue_index: u8) -> Option<usize> {
        (self.descriptor.minimum_render_queue_index..=self.descriptor.maximum_render_queue_index)
            .contains(&render_queue_index)
            .then(|| usize::from(render_queue_index - self.descriptor.minimum_render_queue_index))
    }
}
