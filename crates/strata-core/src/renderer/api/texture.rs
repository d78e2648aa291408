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

//! Texture shape information needed to derive compute dispatch sizes.

/// The dimensions of a texture, by dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDimensions {
    /// A one-dimensional texture.
    D1 {
        /// Width in texels.
        width: u32,
    },
    /// A two-dimensional texture.
    D2 {
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
    },
    /// A two-dimensional texture array.
    D2Array {
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
        /// Number of array slices.
        layers: u32,
    },
    /// A three-dimensional texture.
    D3 {
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
        /// Depth in texels.
        depth: u32,
    },
    /// A cube texture.
    Cube {
        /// Width of one face in texels.
        width: u32,
        /// Height of one face in texels.
        height: u32,
    },
}

impl TextureDimensions {
    /// A cube texture always has six faces.
    pub const CUBE_FACES: u32 = 6;

    /// Returns the extent as `[x, y, z]`, with unused axes set to one.
    ///
    /// Array layers and cube faces occupy the z axis.
    pub fn extent(&self) -> [u32; 3] {
        match *self {
            TextureDimensions::D1 { width } => [width, 1, 1],
            TextureDimensions::D2 { width, height } => [width, height, 1],
            TextureDimensions::D2Array {
                width,
                height,
                layers,
            } => [width, height, layers],
            TextureDimensions::D3 {
                width,
                height,
                depth,
            } => [width, height, depth],
            TextureDimensions::Cube { width, height } => [width, height, Self::CUBE_FACES],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_by_dimensionality() {
        assert_eq!(TextureDimensions::D1 { width: 64 }.extent(), [64, 1, 1]);
        assert_eq!(
            TextureDimensions::D2 {
                width: 64,
                height: 32
            }
            .extent(),
            [64, 32, 1]
        );
        assert_eq!(
            TextureDimensions::D2Array {
                width: 8,
                height: 8,
                layers: 4
            }
            .extent(),
            [8, 8, 4]
        );
        assert_eq!(
            TextureDimensions::D3 {
                width: 4,
                height: 5,
                depth: 6
            }
            .extent(),
            [4, 5, 6]
        );
        assert_eq!(
            TextureDimensions::Cube {
                width: 16,
                height: 16
            }
            .extent(),
            [16, 16, 6]
        );
    }
}
