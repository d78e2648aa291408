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

//! Coalescing of consecutive draws into multi-draw-indirect calls.

use crate::buffer::ScratchRegion;
use strata_core::renderer::{
    Command, CommandBuffer, DrawArguments, DrawIndexedArguments, DrawSource, GraphicsDevice,
    ResourceError,
};

#[derive(Debug, Clone, Copy)]
struct PendingBatch {
    draw_indexed: bool,
    offset: u32,
    number_of_draws: u32,
}

/// Writes argument records back to back into one reserved indirect region and
/// emits one draw command per run of equally indexed records.
#[derive(Debug)]
pub(crate) struct IndirectBatcher {
    region: Option<ScratchRegion>,
    cursor: u32,
    pending: Option<PendingBatch>,
}

impl IndirectBatcher {
    pub(crate) fn new(region: Option<ScratchRegion>) -> Self {
        Self {
            region,
            cursor: 0,
            pending: None,
        }
    }

    pub(crate) fn push_indexed(
        &mut self,
        device: &dyn GraphicsDevice,
        arguments: &DrawIndexedArguments,
        command_buffer: &mut CommandBuffer,
    ) -> Result<(), ResourceError> {
        self.push(device, true, bytemuck::bytes_of(arguments), command_buffer)
    }

    pub(crate) fn push_non_indexed(
        &mut self,
        device: &dyn GraphicsDevice,
        arguments: &DrawArguments,
        command_buffer: &mut CommandBuffer,
    ) -> Result<(), ResourceError> {
        self.push(device, false, bytemuck::bytes_of(arguments), command_buffer)
    }

    /// Emits the pending run, if any.
    pub(crate) fn flush(&mut self, command_buffer: &mut CommandBuffer) {
        let (Some(batch), Some(region)) = (self.pending.take(), self.region) else {
            return;
        };
        let number_of_draws = batch.number_of_draws;
        command_buffer.push(if batch.draw_indexed {
            Command::DrawIndexedGraphics {
                source: DrawSource::Indirect {
                    buffer: region.buffer,
                    offset: batch.offset,
                },
                number_of_draws,
            }
        } else {
            Command::DrawGraphics {
                source: DrawSource::Indirect {
                    buffer: region.buffer,
                    offset: batch.offset,
                },
                number_of_draws,
            }
        });
    }

    fn push(
        &mut self,
        device: &dyn GraphicsDevice,
        draw_indexed: bool,
        record: &[u8],
        command_buffer: &mut CommandBuffer,
    ) -> Result<(), ResourceError> {
        let Some(region) = self.region else {
            panic!("RenderQueue: batched draw without a reserved indirect region");
        };
        if self
            .pending
            .is_some_and(|batch| batch.draw_indexed != draw_indexed)
        {
            self.flush(command_buffer);
        }

        region.write(device, self.cursor, record)?;
        match &mut self.pending {
            Some(batch) => batch.number_of_draws += 1,
            None => {
                self.pending = Some(PendingBatch {
                    draw_indexed,
                    offset: region.offset + self.cursor,
                    number_of_draws: 1,
                })
            }
        }
        self.cursor += record.len() as u32;
        Ok(())
    }
}
