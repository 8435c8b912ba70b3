//! Coordinate types shared by the mount and its transform.
//!
//! All angles are degrees. Hour angles increase westward, so a target on the
//! meridian has `h == 0` and a setting target has `h > 0`.

mod transform;

pub use transform::{refraction_arcmin, GemTransform, PointingModel, Transform, HOME_AXIS1, HOME_AXIS2};

use serde::Deserialize;

/// Mechanical side of the pier the telescope is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum PierSide {
    /// Undetermined, at home.
    #[default]
    None,
    /// East of the pier, looking west of the meridian.
    East,
    /// West of the pier, looking east of the meridian.
    West,
}

impl PierSide {
    /// The opposite side. `None` stays `None`.
    pub fn other(self) -> PierSide {
        match self {
            PierSide::East => PierSide::West,
            PierSide::West => PierSide::East,
            PierSide::None => PierSide::None,
        }
    }
}

/// A position in the mount frame: hour angle, declination and pier side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    /// Hour angle in degrees, (-180, 180].
    pub h: f64,
    /// Declination in degrees.
    pub d: f64,
    /// Pier side the position is (or would be) reached from.
    pub pier_side: PierSide,
}

impl Coordinate {
    /// Create a coordinate with no pier side.
    pub const fn new(h: f64, d: f64) -> Self {
        Self {
            h,
            d,
            pier_side: PierSide::None,
        }
    }

    /// Same position on the given pier side.
    pub fn on_side(self, pier_side: PierSide) -> Self {
        Self { pier_side, ..self }
    }

    /// Equatorial position at local sidereal time `lst` (degrees).
    pub fn to_equatorial(&self, lst: f64) -> Equatorial {
        Equatorial {
            ra: wrap_360(lst - self.h),
            dec: self.d,
        }
    }
}

/// Right ascension and declination, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Equatorial {
    /// Right ascension in degrees, [0, 360).
    pub ra: f64,
    /// Declination in degrees.
    pub dec: f64,
}

impl Equatorial {
    /// Create an equatorial position.
    pub const fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Mount-frame coordinate at local sidereal time `lst` (degrees).
    pub fn to_mount(&self, lst: f64) -> Coordinate {
        Coordinate::new(normalize_degrees(lst - self.ra), self.dec)
    }
}

/// Altitude and azimuth in degrees. Azimuth is measured from north through east.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Horizon {
    /// Altitude in degrees.
    pub alt: f64,
    /// Azimuth in degrees, [0, 360).
    pub az: f64,
}

/// Normalize an angle to (-180, 180].
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = wrap_360(angle);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Normalize an angle to [0, 360).
pub fn wrap_360(angle: f64) -> f64 {
    let a = libm::fmod(angle, 360.0);
    if a < 0.0 {
        a + 360.0
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(190.0) + 170.0).abs() < 1e-12);
        assert!((normalize_degrees(-180.0) - 180.0).abs() < 1e-12);
        assert!((normalize_degrees(180.0) - 180.0).abs() < 1e-12);
        assert!((normalize_degrees(-540.5) - 179.5).abs() < 1e-9);
    }

    #[test]
    fn test_equatorial_round_trip() {
        let lst = 123.4;
        let equ = Equatorial::new(100.0, 20.0);
        let back = equ.to_mount(lst).to_equatorial(lst);
        assert!((back.ra - 100.0).abs() < 1e-9);
        assert!((back.dec - 20.0).abs() < 1e-12);
    }
}
