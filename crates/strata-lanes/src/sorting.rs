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

//! 64-bit sorting keys of queued renderables.
//!
//! ```text
//! opaque:      [pipeline state:16][vertex array:16][resource group:11][depth:21]
//! transparent: [depth:21][pipeline state:16][vertex array:16][resource group:11]
//! ```
//!
//! Opaque keys sort by state first and front to back inside equal state.
//! Transparent keys negate the depth, so ascending keys draw back to front.
//! The resource group field keeps its width but is always written as zero.

/// Bits of the quantized depth.
pub const DEPTH_BITS: u32 = 21;
/// Bits of the resource group field.
pub const RESOURCE_GROUP_BITS: u32 = 11;

const PIPELINE_STATE_MASK: u64 = 0xFFFF;
const VERTEX_ARRAY_MASK: u64 = 0xFFFF;
const RESOURCE_GROUP_MASK: u64 = (1 << RESOURCE_GROUP_BITS) - 1;

/// Maps a float to its top 21 bits in an order-preserving unsigned encoding.
///
/// Negative values have all bits flipped, positive values only the sign bit, so
/// the encoded integers compare like the floats did.
pub fn quantize_depth(depth: f32) -> u64 {
    let bits = depth.to_bits();
    let flipped = if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    };
    u64::from(flipped >> (32 - DEPTH_BITS))
}

/// Key of a renderable in an opaque pass.
pub fn opaque_sorting_key(
    pipeline_state_id: u64,
    vertex_array_id: u64,
    resource_group_id: u64,
    distance_to_camera: f32,
) -> u64 {
    (pipeline_state_id & PIPELINE_STATE_MASK) << 48
        | (vertex_array_id & VERTEX_ARRAY_MASK) << 32
        | (resource_group_id & RESOURCE_GROUP_MASK) << DEPTH_BITS
        | quantize_depth(distance_to_camera)
}

/// Key of a renderable in a transparent pass.
pub fn transparent_sorting_key(
    pipeline_state_id: u64,
    vertex_array_id: u64,
    resource_group_id: u64,
    distance_to_camera: f32,
) -> u64 {
    quantize_depth(-distance_to_camera) << 43
        | (pipeline_state_id & PIPELINE_STATE_MASK) << 27
        | (vertex_array_id & VERTEX_ARRAY_MASK) << RESOURCE_GROUP_BITS
        | (resource_group_id & RESOURCE_GROUP_MASK)
}
