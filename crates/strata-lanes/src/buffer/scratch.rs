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

//! A growable pool of fixed-size, CPU-mapped GPU scratch buffers.
//!
//! Regions are handed out with a two-phase protocol: [`ScratchBufferManager::acquire`]
//! reserves `n` bytes at the cursor, and the cursor only moves past them on the
//! next call. When a reservation does not fit, the current buffer is unmapped and
//! parked, and a free buffer (or a new one) becomes current.
//!
//! ```text
//! acquire(N)  -> offset 0        reserved: N
//! acquire(M)  -> offset N        reserved: M
//! acquire(K)  -> offset N + M    (or offset 0 of the next buffer)
//! ```
//!
//! Used buffers go back to the free-list in
//! [`on_pre_command_buffer_execution`](ScratchBufferManager::on_pre_command_buffer_execution)
//! and are only released to the device by [`destroy`](ScratchBufferManager::destroy).

use std::borrow::Cow;
use strata_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, DeviceCapabilities, GraphicsDevice, ResourceError,
};

/// The role of a scratch buffer, selecting its usage flags and device limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScratchBufferKind {
    /// Indirect draw arguments.
    Indirect,
    /// Per-instance uniform data.
    Uniform,
    /// Per-instance texture buffer data.
    Texture,
}

impl ScratchBufferKind {
    /// The label used in logs and debug names.
    pub fn label(self) -> &'static str {
        match self {
            ScratchBufferKind::Indirect => "indirect",
            ScratchBufferKind::Uniform => "uniform",
            ScratchBufferKind::Texture => "texture",
        }
    }

    /// Usage flags of buffers of this kind.
    pub fn usage(self) -> BufferUsage {
        let role = match self {
            ScratchBufferKind::Indirect => BufferUsage::INDIRECT,
            ScratchBufferKind::Uniform => BufferUsage::UNIFORM,
            ScratchBufferKind::Texture => BufferUsage::TEXTURE_BUFFER,
        };
        BufferUsage::MAP_WRITE | role
    }

    /// The device limit for buffers of this kind.
    pub fn device_limit(self, capabilities: &DeviceCapabilities) -> u32 {
        match self {
            ScratchBufferKind::Indirect => capabilities.maximum_indirect_buffer_size,
            ScratchBufferKind::Uniform => capabilities.maximum_uniform_buffer_size,
            ScratchBufferKind::Texture => capabilities.maximum_texture_buffer_size,
        }
    }
}

/// A reserved, writable range of the current scratch buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchRegion {
    /// The mapped buffer.
    pub buffer: BufferId,
    /// Byte offset of the region inside the buffer.
    pub offset: u32,
    /// Reserved size in bytes.
    pub size: u32,
}

impl ScratchRegion {
    /// Writes `data` at `relative_offset` bytes into the region.
    pub fn write(
        &self,
        device: &dyn GraphicsDevice,
        relative_offset: u32,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        debug_assert!(
            relative_offset as usize + data.len() <= self.size as usize,
            "ScratchRegion({:?}): write of {} bytes at {} exceeds the reserved {} bytes",
            self.buffer,
            data.len(),
            relative_offset,
            self.size
        );
        device.write_mapped_buffer(
            self.buffer,
            u64::from(self.offset) + u64::from(relative_offset),
            data,
        )
    }
}

/// Hands out mapped regions from a growable set of fixed-size GPU buffers.
#[derive(Debug)]
pub struct ScratchBufferManager {
    kind: ScratchBufferKind,
    maximum_buffer_size: u32,
    free_buffers: Vec<BufferId>,
    used_buffers: Vec<BufferId>,
    current_buffer: Option<BufferId>,
    current_offset: u32,
    /// Bytes reserved by the previous `acquire`, not yet stepped over.
    previously_requested_bytes: u32,
    buffer_generation: u64,
    number_of_created_buffers: usize,
}

impl ScratchBufferManager {
    /// Creates an empty manager. No buffer is allocated before the first reservation.
    ///
    /// The buffer size is the smaller of `default_buffer_size` and the device limit
    /// for `kind`.
    pub fn new(device: &dyn GraphicsDevice, kind: ScratchBufferKind, default_buffer_size: u32) -> Self {
        let maximum_buffer_size = default_buffer_size.min(kind.device_limit(&device.capabilities()));
        assert!(
            maximum_buffer_size > 0,
            "ScratchBufferManager({}): buffer size is zero",
            kind.label()
        );
        Self {
            kind,
            maximum_buffer_size,
            free_buffers: Vec::new(),
            used_buffers: Vec::new(),
            current_buffer: None,
            current_offset: 0,
            previously_requested_bytes: 0,
            buffer_generation: 0,
            number_of_created_buffers: 0,
        }
    }

    pub fn kind(&self) -> ScratchBufferKind {
        self.kind
    }

    /// Size of every buffer of this manager, and thus the largest possible reservation.
    pub fn maximum_buffer_size(&self) -> u32 {
        self.maximum_buffer_size
    }

    /// Increments each time a new buffer becomes current.
    pub fn buffer_generation(&self) -> u64 {
        self.buffer_generation
    }

    pub fn current_buffer(&self) -> Option<BufferId> {
        self.current_buffer
    }

    /// Number of buffers allocated on the device over the manager's lifetime.
    pub fn number_of_created_buffers(&self) -> usize {
        self.number_of_created_buffers
    }

    /// Reserves `number_of_bytes` and returns where to write them.
    ///
    /// The cursor first steps over the bytes reserved by the previous call.
    ///
    /// # Panics
    ///
    /// Panics if `number_of_bytes` exceeds [`maximum_buffer_size`](Self::maximum_buffer_size).
    pub fn acquire(
        &mut self,
        device: &dyn GraphicsDevice,
        number_of_bytes: u32,
    ) -> Result<ScratchRegion, ResourceError> {
        self.acquire_aligned(device, number_of_bytes, 1)
    }

    /// Like [`acquire`](Self::acquire), but the returned offset is a multiple of `alignment`.
    ///
    /// The skipped padding stays unwritten. Instance data indexed as
    /// `location * block_size` from the start of the buffer reserves with the block
    /// size as alignment, so `offset / block_size` is the location.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is zero or `number_of_bytes` exceeds
    /// [`maximum_buffer_size`](Self::maximum_buffer_size).
    pub fn acquire_aligned(
        &mut self,
        device: &dyn GraphicsDevice,
        number_of_bytes: u32,
        alignment: u32,
    ) -> Result<ScratchRegion, ResourceError> {
        assert!(
            number_of_bytes <= self.maximum_buffer_size,
            "ScratchBufferManager({}): {} bytes requested, buffers hold {} bytes",
            self.kind.label(),
            number_of_bytes,
            self.maximum_buffer_size
        );

        let buffer = match self.current_buffer {
            Some(buffer) if !self.would_overflow_aligned(number_of_bytes, alignment) => {
                self.current_offset = self.aligned_cursor(alignment) as u32;
                buffer
            }
            _ => self.start_new_buffer(device)?,
        };
        self.previously_requested_bytes = number_of_bytes;

        Ok(ScratchRegion {
            buffer,
            offset: self.current_offset,
            size: number_of_bytes,
        })
    }

    /// Whether reserving `number_of_bytes` now would rotate to a new buffer.
    ///
    /// Always `false` while no buffer is current.
    pub fn would_overflow(&self, number_of_bytes: u32) -> bool {
        self.would_overflow_aligned(number_of_bytes, 1)
    }

    /// Whether reserving `number_of_bytes` at the next multiple of `alignment` would
    /// rotate to a new buffer.
    pub fn would_overflow_aligned(&self, number_of_bytes: u32, alignment: u32) -> bool {
        self.current_buffer.is_some()
            && self.aligned_cursor(alignment) + u64::from(number_of_bytes)
                > u64::from(self.maximum_buffer_size)
    }

    /// The cursor past the previous reservation, rounded up to `alignment`.
    fn aligned_cursor(&self, alignment: u32) -> u64 {
        assert!(
            alignment > 0,
            "ScratchBufferManager({}): zero alignment",
            self.kind.label()
        );
        (u64::from(self.current_offset) + u64::from(self.previously_requested_bytes))
            .next_multiple_of(u64::from(alignment))
    }

    /// Parks the current buffer and makes a free or new buffer current.
    pub fn start_new_buffer(&mut self, device: &dyn GraphicsDevice) -> Result<BufferId, ResourceError> {
        self.release_current_buffer(device)?;

        let buffer = match self.free_buffers.pop() {
            Some(buffer) => buffer,
            None => self.create_buffer(device)?,
        };
        device.map_buffer(buffer)?;

        self.current_buffer = Some(buffer);
        self.current_offset = 0;
        self.previously_requested_bytes = 0;
        self.buffer_generation += 1;
        log::trace!(
            "ScratchBufferManager({}): buffer {:?} is current (generation {})",
            self.kind.label(),
            buffer,
            self.buffer_generation
        );
        Ok(buffer)
    }

    /// Unmaps the current buffer and returns every used buffer to the free-list.
    ///
    /// Must be called once the command buffer recorded against these buffers is
    /// handed over for execution.
    pub fn on_pre_command_buffer_execution(
        &mut self,
        device: &dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        self.release_current_buffer(device)?;
        // Reversed so the first buffer of this frame is the first reused next frame.
        self.free_buffers.extend(self.used_buffers.drain(..).rev());
        self.current_offset = 0;
        self.previously_requested_bytes = 0;
        Ok(())
    }

    /// Releases every buffer to the device.
    ///
    /// # Panics
    ///
    /// Panics if a buffer is still in use, i.e. the frame was not finished with
    /// [`on_pre_command_buffer_execution`](Self::on_pre_command_buffer_execution).
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        assert!(
            self.current_buffer.is_none() && self.used_buffers.is_empty(),
            "ScratchBufferManager({}): destroyed with buffers still in use",
            self.kind.label()
        );
        for buffer in self.free_buffers {
            if let Err(error) = device.destroy_buffer(buffer) {
                log::warn!(
                    "ScratchBufferManager({}): failed to destroy buffer {:?}: {}",
                    self.kind.label(),
                    buffer,
                    error
                );
            }
        }
    }

    fn release_current_buffer(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        if let Some(buffer) = self.current_buffer.take() {
            device.unmap_buffer(buffer)?;
            self.used_buffers.push(buffer);
        }
        Ok(())
    }

    fn create_buffer(&mut self, device: &dyn GraphicsDevice) -> Result<BufferId, ResourceError> {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(Cow::Owned(format!(
                "{} scratch buffer {}",
                self.kind.label(),
                self.number_of_created_buffers
            ))),
            size: u64::from(self.maximum_buffer_size),
            usage: self.kind.usage(),
        })?;
        self.number_of_created_buffers += 1;
        log::debug!(
            "ScratchBufferManager({}): allocated buffer {:?} of {} bytes",
            self.kind.label(),
            buffer,
            self.maximum_buffer_size
        );
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::renderer::HeadlessGraphicsDevice;

    fn manager(device: &HeadlessGraphicsDevice, size: u32) -> ScratchBufferManager {
        ScratchBufferManager::new(device, ScratchBufferKind::Uniform, size)
    }

    #[test]
    fn test_offset_advances_by_previous_request() {
        let device = HeadlessGraphicsDevice::new();
        let mut scratch = manager(&device, 1024);

        let first = scratch.acquire(&device, 100).unwrap();
        let second = scratch.acquire(&device, 40).unwrap();
        let third = scratch.acquire(&device, 8).unwrap();

        assert_eq!(first.offset, 0);
        assert_eq!(second.offset, 100);
        assert_eq!(third.offset, 140);
        assert_eq!(first.buffer, third.buffer);
    }

    #[test]
    fn test_aligned_reservation_skips_to_next_multiple() {
        let device = HeadlessGraphicsDevice::new();
        let mut scratch = manager(&device, 128);

        let first = scratch.acquire_aligned(&device, 16, 16).unwrap();
        let second = scratch.acquire_aligned(&device, 32, 32).unwrap();
        assert!(!scratch.would_overflow_aligned(16, 16));
        assert!(scratch.would_overflow_aligned(48, 48));
        let third = scratch.acquire_aligned(&device, 48, 48).unwrap();

        assert_eq!((first.offset, second.offset), (0, 32));
        assert_eq!(third.offset, 0);
        assert_ne!(third.buffer, first.buffer);
        assert_eq!(scratch.buffer_generation(), 2);
    }

    #[test]
    fn test_size_is_capped_by_device_limit() {
        let device = HeadlessGraphicsDevice::with_capabilities(DeviceCapabilities {
            maximum_uniform_buffer_size: 256,
            ..DeviceCapabilities::default()
        });
        let scratch = manager(&device, 64 * 1024);
        assert_eq!(scratch.maximum_buffer_size(), 256);
    }

    #[test]
    fn test_overflow_rotates_and_bumps_generation() {
        let device = HeadlessGraphicsDevice::new();
        let mut scratch = manager(&device, 256);

        let first = scratch.acquire(&device, 200).unwrap();
        assert!(scratch.would_overflow(100));
        let second = scratch.acquire(&device, 100).unwrap();

        assert_ne!(first.buffer, second.buffer);
        assert_eq!(second.offset, 0);
        assert_eq!(scratch.buffer_generation(), 2);
        assert!(!device.is_mapped(first.buffer));
        assert!(device.is_mapped(second.buffer));
    }

    #[test]
    fn test_frame_end_recycles_buffers() {
        let device = HeadlessGraphicsDevice::new();
        let mut scratch = manager(&device, 256);

        for _ in 0..3 {
            scratch.acquire(&device, 200).unwrap();
            scratch.acquire(&device, 200).unwrap();
            scratch.on_pre_command_buffer_execution(&device).unwrap();
        }

        assert_eq!(scratch.number_of_created_buffers(), 2);
        assert_eq!(device.live_buffer_count(), 2);
        scratch.destroy(&device);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn test_free_list_reuses_first_buffer_first() {
        let device = HeadlessGraphicsDevice::new();
        let mut scratch = manager(&device, 256);
        let first = scratch.acquire(&device, 200).unwrap();
        scratch.acquire(&device, 200).unwrap();
        scratch.on_pre_command_buffer_execution(&device).unwrap();

        let reused = scratch.acquire(&device, 16).unwrap();
        assert_eq!(reused.buffer, first.buffer);
        assert_eq!(reused.offset, 0);
        scratch.on_pre_command_buffer_execution(&device).unwrap();
    }

    #[test]
    #[should_panic(expected = "bytes requested")]
    fn test_oversized_request_panics() {
        let device = HeadlessGraphicsDevice::new();
        let mut scratch = manager(&device, 256);
        let _ = scratch.acquire(&device, 257);
    }

    #[test]
    #[should_panic(expected = "still in use")]
    fn test_destroy_with_current_buffer_panics() {
        let device = HeadlessGraphicsDevice::new();
        let mut scratch = manager(&device, 256);
        scratch.acquire(&device, 16).unwrap();
        scratch.destroy(&device);
    }
}
