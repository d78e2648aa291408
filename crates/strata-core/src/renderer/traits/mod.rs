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

//! Traits at the seams between the render queue and its collaborators.

mod graphics_device;
mod instance_reference;
mod pass_buffer;
mod pipeline_state_cache;
mod providers;

pub use self::graphics_device::*;
pub use self::instance_reference::*;
pub use self::pass_buffer::*;
pub use self::pipeline_state_cache::*;
pub use self::providers::*;
