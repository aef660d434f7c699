//! Initial-terrain (frame 0) generator selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{shapes, Grid, TerrainError};
use crate::noise::{fbm_grid, perlin_grid, FractalNoiseConfig};

/// Strategy used to build frame 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerrainMethod {
    #[serde(alias = "perlin")]
    PerlinNoise,
    Fbm,
    #[serde(alias = "semiSphere")]
    Hemisphere,
    Cone,
    Flat,
    Sigmoid,
}

impl TerrainMethod {
    /// Wire name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            TerrainMethod::PerlinNoise => "perlin-noise",
            TerrainMethod::Fbm => "fbm",
            TerrainMethod::Hemisphere => "hemisphere",
            TerrainMethod::Cone => "cone",
            TerrainMethod::Flat => "flat",
            TerrainMethod::Sigmoid => "sigmoid",
        }
    }
}

impl fmt::Display for TerrainMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a method name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for TerrainMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perlin-noise" | "perlin" => Ok(TerrainMethod::PerlinNoise),
            "fbm" => Ok(TerrainMethod::Fbm),
            "hemisphere" | "semiSphere" => Ok(TerrainMethod::Hemisphere),
            "cone" => Ok(TerrainMethod::Cone),
            "flat" => Ok(TerrainMethod::Flat),
            "sigmoid" => Ok(TerrainMethod::Sigmoid),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// Frame-0 generator choice and its parameters.
///
/// Noise methods read `seed`, `frequency`, `amplitude` and (fBm only)
/// `octaves`, `persistence`, `lacunarity`. Shape methods read `radius` and
/// `height` and are centred on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainConfig {
    pub method: TerrainMethod,
    #[serde(default = "defaults::seed")]
    pub seed: u32,
    #[serde(default = "defaults::frequency")]
    pub frequency: f32,
    #[serde(default = "defaults::amplitude")]
    pub amplitude: f32,
    #[serde(default = "defaults::octaves")]
    pub octaves: u32,
    #[serde(default = "defaults::persistence")]
    pub persistence: f32,
    #[serde(default = "defaults::lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "defaults::radius")]
    pub radius: f32,
    #[serde(default = "defaults::height")]
    pub height: f32,
}

mod defaults {
    pub fn seed() -> u32 {
        12345
    }
    pub fn frequency() -> f32 {
        0.01
    }
    pub fn amplitude() -> f32 {
        50.0
    }
    pub fn octaves() -> u32 {
        6
    }
    pub fn persistence() -> f32 {
        0.5
    }
    pub fn lacunarity() -> f32 {
        2.0
    }
    pub fn radius() -> f32 {
        128.0
    }
    pub fn height() -> f32 {
        100.0
    }
}

impl TerrainConfig {
    /// Configuration for `method` with every parameter at its default.
    pub fn new(method: TerrainMethod) -> Self {
        Self {
            method,
            seed: defaults::seed(),
            frequency: defaults::frequency(),
            amplitude: defaults::amplitude(),
            octaves: defaults::octaves(),
            persistence: defaults::persistence(),
            lacunarity: defaults::lacunarity(),
            radius: defaults::radius(),
            height: defaults::height(),
        }
    }

    /// The fBm parameters carried by this configuration.
    pub fn fractal(&self) -> FractalNoiseConfig {
        FractalNoiseConfig {
            octaves: self.octaves,
            frequency: self.frequency,
            amplitude: self.amplitude,
            lacunarity: self.lacunarity,
            persistence: self.persistence,
            seed: self.seed,
        }
    }

    /// Checks the parameters the selected method reads.
    pub fn validate(&self) -> Result<(), TerrainError> {
        match self.method {
            TerrainMethod::PerlinNoise => {
                if !self.frequency.is_finite() {
                    return Err(TerrainError::NonFinite("frequency"));
                }
                if self.frequency <= 0.0 {
                    return Err(TerrainError::NonPositive("frequency", self.frequency));
                }
                if !self.amplitude.is_finite() {
                    return Err(TerrainError::NonFinite("amplitude"));
                }
                Ok(())
            }
            TerrainMethod::Fbm => self.fractal().validate(),
            TerrainMethod::Hemisphere | TerrainMethod::Cone | TerrainMethod::Sigmoid => {
                if !self.radius.is_finite() {
                    return Err(TerrainError::NonFinite("radius"));
                }
                if self.radius <= 0.0 {
                    return Err(TerrainError::NonPositive("radius", self.radius));
                }
                if !self.height.is_finite() {
                    return Err(TerrainError::NonFinite("height"));
                }
                Ok(())
            }
            TerrainMethod::Flat => {
                if !self.height.is_finite() {
                    return Err(TerrainError::NonFinite("height"));
                }
                Ok(())
            }
        }
    }

    /// Builds frame 0 for a `width` x `height` grid.
    pub fn generate(&self, width: u32, height: u32) -> Result<Grid, TerrainError> {
        if width == 0 || height == 0 {
            return Err(TerrainError::EmptyGrid { width, height });
        }
        self.validate()?;

        let cx = (width as f32 - 1.0) * 0.5;
        let cy = (height as f32 - 1.0) * 0.5;

        let grid = match self.method {
            TerrainMethod::PerlinNoise => {
                perlin_grid(width, height, self.seed, self.frequency, self.amplitude)?
            }
            TerrainMethod::Fbm => fbm_grid(width, height, &self.fractal())?,
            TerrainMethod::Hemisphere => shapes::hemisphere(width, height, cx, cy, self.radius),
            TerrainMethod::Cone => shapes::cone(width, height, cx, cy, self.radius, self.height),
            TerrainMethod::Flat => shapes::flat(width, height, self.height),
            TerrainMethod::Sigmoid => {
                shapes::sigmoid(width, height, cx, cy, self.radius, self.height)
            }
        };

        log::debug!(
            "generated frame 0 ({}) at {}x{}: range {:?}",
            self.method,
            width,
            height,
            grid.height_range()
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_roundtrip() {
        for method in [
            TerrainMethod::PerlinNoise,
            TerrainMethod::Fbm,
            TerrainMethod::Hemisphere,
            TerrainMethod::Cone,
            TerrainMethod::Flat,
            TerrainMethod::Sigmoid,
        ] {
            assert_eq!(method.name().parse::<TerrainMethod>(), Ok(method));
        }
        assert_eq!("semiSphere".parse::<TerrainMethod>(), Ok(TerrainMethod::Hemisphere));
        assert_eq!("perlin".parse::<TerrainMethod>(), Ok(TerrainMethod::PerlinNoise));
        assert!("voronoi".parse::<TerrainMethod>().is_err());
    }

    #[test]
    fn test_generate_every_method() {
        for method in ["perlin-noise", "fbm", "hemisphere", "cone", "flat", "sigmoid"] {
            let mut config = TerrainConfig::new(method.parse().unwrap());
            config.radius = 10.0;
            config.frequency = 0.05;
            let grid = config.generate(24, 16).unwrap();
            assert_eq!(grid.len(), 24 * 16, "{}", method);
        }
    }

    #[test]
    fn test_shapes_centred_on_grid() {
        let mut config = TerrainConfig::new(TerrainMethod::Cone);
        config.radius = 5.0;
        config.height = 9.0;
        let grid = config.generate(11, 11).unwrap();
        assert_eq!(grid.get(5, 5), 9.0);
        assert_eq!(grid.max_height(), 9.0);
    }

    #[test]
    fn test_flat_uses_height() {
        let mut config = TerrainConfig::new(TerrainMethod::Flat);
        config.height = 3.0;
        let grid = config.generate(4, 4).unwrap();
        assert!(grid.cells().iter().all(|&h| h == 3.0));
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let mut fbm = TerrainConfig::new(TerrainMethod::Fbm);
        fbm.octaves = 20;
        assert!(fbm.validate().is_err());

        let mut perlin = TerrainConfig::new(TerrainMethod::PerlinNoise);
        perlin.frequency = -1.0;
        assert!(perlin.generate(8, 8).is_err());

        let mut cone = TerrainConfig::new(TerrainMethod::Cone);
        cone.radius = 0.0;
        assert!(cone.validate().is_err());

        assert!(TerrainConfig::new(TerrainMethod::Flat).generate(0, 4).is_err());
    }
}
