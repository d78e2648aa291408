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

//! # Strata Core
//!
//! Foundational crate containing the traits, handle types, and interface contracts
//! that the render queue is written against.
//!
//! Nothing in here knows how renderables are sorted or batched. It defines the
//! "common language" shared by the data crate (renderables, materials) and the
//! hot-path lanes (render queue, scratch buffers): an opaque [`GraphicsDevice`],
//! a [`CommandBuffer`] of ordered command records, and the material property model.
//!
//! [`GraphicsDevice`]: renderer::GraphicsDevice
//! [`CommandBuffer`]: renderer::CommandBuffer

#![warn(missing_docs)]

pub mod material;
pub mod renderer;
pub mod scene;
pub mod utils;

pub use utils::string_id::StringId;
