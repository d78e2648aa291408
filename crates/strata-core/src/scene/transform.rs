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

use glam::{DVec3, Quat, Vec3};

/// The world transform of a renderable manager.
///
/// Positions are kept in 64-bit precision so large worlds stay stable; values are
/// made camera-relative before they are truncated for the GPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: DVec3,
    /// World rotation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a transform from its components.
    pub fn new(position: DVec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Creates a translation-only transform.
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// The position relative to `camera_world_position`, truncated to 32-bit.
    ///
    /// The subtraction happens in 64-bit precision.
    pub fn camera_relative_position(&self, camera_world_position: DVec3) -> Vec3 {
        (self.position - camera_world_position).as_vec3()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
