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

//! Provides the backend-agnostic rendering contracts consumed by the render queue.
//!
//! This module defines the 'what' of GPU work: opaque handles, buffer and
//! resource-group descriptors, the ordered [`CommandBuffer`] of command records,
//! and the [`GraphicsDevice`] trait through which scratch buffers are created,
//! mapped, and released. Concrete backends implement [`GraphicsDevice`]; the
//! [`headless`] module ships an in-memory implementation.

pub mod api;
pub mod compositor;
pub mod error;
pub mod headless;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::compositor::CompositorContextData;
pub use self::error::ResourceError;
pub use self::headless::HeadlessGraphicsDevice;
pub use self::traits::{
    GraphicsDevice, InstanceReferenceContext, InstanceReferenceResolver, PassBufferManager,
    PipelineStateCacheManager, PipelineStateLookup, PipelineStateRequest, SkeletonProvider,
    TextureProvider,
};
