use std::{fmt, ops, str::FromStr};

use crate::foundation::error::FlyaroundError;

/// Zero-based index of a frame in the fly-around sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cartesian point or displacement in scene space.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Spherical form of this vector. `atan2(0, 0) == 0`, so the origin maps to `(0, 0, 0)`.
    pub fn to_spherical(self) -> SphericalVector {
        let xy = (self.x * self.x + self.y * self.y).sqrt();
        SphericalVector {
            radius: self.length(),
            polar: xy.atan2(self.z),
            azimuth: self.y.atan2(self.x),
        }
    }
}

impl ops::Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl ops::Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Renders as `x,y,z`, the form the render engine accepts on its command line.
impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Vector3 {
    type Err = FlyaroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(FlyaroundError::validation(format!(
                "expected a point as 'x,y,z', got '{s}'"
            )));
        };

        let parse = |v: &str| {
            v.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    FlyaroundError::validation(format!("invalid coordinate '{v}' in '{s}'"))
                })
        };
        Ok(Self::new(parse(*x)?, parse(*y)?, parse(*z)?))
    }
}

/// `(radius, polar, azimuth)` with the polar angle measured from +z and the azimuth in the
/// xy-plane from +x.
///
/// Angles are not normalized: a polar angle stepped past `π` keeps rotating through the pole.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SphericalVector {
    pub radius: f64,
    pub polar: f64,
    pub azimuth: f64,
}

impl SphericalVector {
    pub fn to_cartesian(self) -> Vector3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        Vector3 {
            x: self.radius * cos_azimuth * sin_polar,
            y: self.radius * sin_azimuth * sin_polar,
            z: self.radius * cos_polar,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
