//! Coordinate transforms for a German equatorial mount.
//!
//! The mount consumes these as pure functions through the [`Transform`] trait;
//! [`GemTransform`] is the implementation used unless a host supplies its own.
//!
//! Instrument angles: axis1 is the hour angle axis (`0` with the counterweight
//! down), axis2 is the declination axis (`90` pointing at the pole). Both pier
//! sides meet at the pole, the home position.

use libm::{asin, atan2, cos, sin, tan};

use super::{normalize_degrees, wrap_360, Coordinate, Horizon, PierSide};
use crate::config::units::ARCSEC_PER_DEG;
use crate::config::PointingModelConfig;

/// Axis1 instrument angle at home.
pub const HOME_AXIS1: f64 = 0.0;

/// Axis2 instrument angle at home (the celestial pole).
pub const HOME_AXIS2: f64 = 90.0;

/// Coordinate transform contract.
pub trait Transform {
    /// Site latitude in degrees.
    fn latitude(&self) -> f64;

    /// Replace the site latitude once the time/location source is ready.
    fn set_latitude(&mut self, latitude: f64);

    /// Mount frame to horizon frame.
    fn equ_to_hor(&self, coord: &Coordinate) -> Horizon;

    /// Horizon frame to mount frame. The pier side is left undetermined.
    fn hor_to_equ(&self, hor: &Horizon) -> Coordinate;

    /// Instrument axis angles `(axis1, axis2)` for a coordinate on its pier side.
    fn mount_to_instrument(&self, coord: &Coordinate) -> (f64, f64);

    /// Coordinate at instrument angles. With `PierSide::None` the side is
    /// derived from axis2.
    fn instrument_to_mount(&self, axis1: f64, axis2: f64, pier_side: PierSide) -> Coordinate;

    /// Sign of axis2 motion for increasing declination on a pier side.
    fn axis2_direction(&self, pier_side: PierSide) -> f64;

    /// Natural pier side for an hour angle.
    fn pier_side_for(&self, h: f64) -> PierSide {
        if h >= 0.0 {
            PierSide::East
        } else {
            PierSide::West
        }
    }

    /// Apply the pointing model to a coordinate. Identity by default.
    fn apply_model(&self, coord: &Coordinate) -> Coordinate {
        *coord
    }

    /// Where atmospheric refraction makes a coordinate appear.
    fn refract(&self, coord: &Coordinate) -> Coordinate {
        let mut hor = self.equ_to_hor(coord);
        hor.alt += refraction_arcmin(hor.alt) / 60.0;
        self.hor_to_equ(&hor).on_side(coord.pier_side)
    }
}

/// Atmospheric refraction (Saemundsson), true to apparent, in arcminutes.
///
/// Altitudes below -1° are clamped to -1°.
pub fn refraction_arcmin(true_alt: f64) -> f64 {
    let alt = true_alt.max(-1.0);
    let r = 1.02 / tan((alt + 10.3 / (alt + 5.11)).to_radians());
    r.max(0.0)
}

/// Polar axis misalignment terms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointingModel {
    /// Elevation error of the polar axis (ME), arcseconds.
    pub polar_altitude_error: f64,
    /// Azimuth error of the polar axis (MA), arcseconds.
    pub polar_azimuth_error: f64,
}

impl PointingModel {
    /// Build from configuration.
    pub fn from_config(config: &PointingModelConfig) -> Self {
        Self {
            polar_altitude_error: config.polar_altitude_error_arcsec,
            polar_azimuth_error: config.polar_azimuth_error_arcsec,
        }
    }

    /// True when the model has no effect.
    pub fn is_zero(&self) -> bool {
        self.polar_altitude_error == 0.0 && self.polar_azimuth_error == 0.0
    }

    /// Offset a true position to where a misaligned mount sees it.
    pub fn apply(&self, coord: &Coordinate) -> Coordinate {
        if self.is_zero() {
            return *coord;
        }
        let me = self.polar_altitude_error / ARCSEC_PER_DEG;
        let ma = self.polar_azimuth_error / ARCSEC_PER_DEG;
        let h = coord.h.to_radians();
        // tan(dec) diverges at the pole
        let tan_d = tan(coord.d.clamp(-89.0, 89.0).to_radians());

        let dh = me * sin(h) * tan_d - ma * cos(h) * tan_d;
        let dd = me * cos(h) + ma * sin(h);

        Coordinate {
            h: normalize_degrees(coord.h + dh),
            d: coord.d + dd,
            pier_side: coord.pier_side,
        }
    }
}

/// German equatorial mount transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemTransform {
    latitude: f64,
    model: PointingModel,
}

impl GemTransform {
    /// Create a transform for a site latitude.
    pub fn new(latitude: f64) -> Self {
        Self {
            latitude,
            model: PointingModel::default(),
        }
    }

    /// Attach a pointing model.
    pub fn with_model(mut self, model: PointingModel) -> Self {
        self.model = model;
        self
    }

    /// The pointing model.
    pub fn model(&self) -> &PointingModel {
        &self.model
    }

    // Declination measured toward the visible pole.
    fn hemisphere(&self) -> f64 {
        if self.latitude >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

impl Transform for GemTransform {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn set_latitude(&mut self, latitude: f64) {
        self.latitude = latitude;
    }

    fn equ_to_hor(&self, coord: &Coordinate) -> Horizon {
        let (h, d, lat) = (
            coord.h.to_radians(),
            coord.d.to_radians(),
            self.latitude.to_radians(),
        );
        let up = sin(lat) * sin(d) + cos(lat) * cos(d) * cos(h);
        let north = cos(lat) * sin(d) - sin(lat) * cos(d) * cos(h);
        let east = -cos(d) * sin(h);

        Horizon {
            alt: asin(up.clamp(-1.0, 1.0)).to_degrees(),
            az: wrap_360(atan2(east, north).to_degrees()),
        }
    }

    fn hor_to_equ(&self, hor: &Horizon) -> Coordinate {
        let (alt, az, lat) = (
            hor.alt.to_radians(),
            hor.az.to_radians(),
            self.latitude.to_radians(),
        );
        let up = sin(alt);
        let north = cos(alt) * cos(az);
        let east = cos(alt) * sin(az);

        let sin_d = sin(lat) * up + cos(lat) * north;
        let h = atan2(-east, cos(lat) * up - sin(lat) * north);

        Coordinate::new(
            normalize_degrees(h.to_degrees()),
            asin(sin_d.clamp(-1.0, 1.0)).to_degrees(),
        )
    }

    fn mount_to_instrument(&self, coord: &Coordinate) -> (f64, f64) {
        let p = coord.d * self.hemisphere();
        match coord.pier_side {
            PierSide::West => (coord.h + 90.0, 180.0 - p),
            PierSide::East | PierSide::None => (coord.h - 90.0, p),
        }
    }

    fn instrument_to_mount(&self, axis1: f64, axis2: f64, pier_side: PierSide) -> Coordinate {
        let side = match pier_side {
            PierSide::None if axis2 > HOME_AXIS2 => PierSide::West,
            PierSide::None => PierSide::East,
            side => side,
        };
        let (h, p) = match side {
            PierSide::West => (axis1 - 90.0, 180.0 - axis2),
            _ => (axis1 + 90.0, axis2),
        };
        Coordinate {
            h: normalize_degrees(h),
            d: p * self.hemisphere(),
            pier_side: side,
        }
    }

    fn axis2_direction(&self, pier_side: PierSide) -> f64 {
        match pier_side {
            PierSide::West => -self.hemisphere(),
            PierSide::East | PierSide::None => self.hemisphere(),
        }
    }

    fn apply_model(&self, coord: &Coordinate) -> Coordinate {
        self.model.apply(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_altitude_on_meridian() {
        let t = GemTransform::new(45.0);
        let hor = t.equ_to_hor(&Coordinate::new(0.0, 20.0));
        assert!((hor.alt - 65.0).abs() < 1e-9);
        assert!((hor.az - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizon_round_trip() {
        let t = GemTransform::new(-33.0);
        let c = Coordinate::new(-47.0, -12.5);
        let back = t.hor_to_equ(&t.equ_to_hor(&c));
        assert!((back.h - c.h).abs() < 1e-9);
        assert!((back.d - c.d).abs() < 1e-9);
    }

    #[test]
    fn test_instrument_round_trip_both_sides() {
        let t = GemTransform::new(45.0);
        for side in [PierSide::East, PierSide::West] {
            let c = Coordinate::new(10.0, 30.0).on_side(side);
            let (a1, a2) = t.mount_to_instrument(&c);
            let back = t.instrument_to_mount(a1, a2, side);
            assert!((back.h - 10.0).abs() < 1e-9);
            assert!((back.d - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pole_is_home_on_both_sides() {
        for lat in [45.0, -45.0] {
            let t = GemTransform::new(lat);
            let pole = if lat > 0.0 { 90.0 } else { -90.0 };
            let (_, east) = t.mount_to_instrument(&Coordinate::new(0.0, pole).on_side(PierSide::East));
            let (_, west) = t.mount_to_instrument(&Coordinate::new(0.0, pole).on_side(PierSide::West));
            assert!((east - HOME_AXIS2).abs() < 1e-12);
            assert!((west - HOME_AXIS2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_refraction_at_horizon() {
        // Saemundsson gives about 29' at the horizon
        assert!((refraction_arcmin(0.0) - 29.0).abs() < 0.5);
        assert!(refraction_arcmin(90.0) < 0.01);
        assert_eq!(refraction_arcmin(-10.0), refraction_arcmin(-1.0));
    }

    #[test]
    fn test_zero_model_is_identity() {
        let model = PointingModel::default();
        let c = Coordinate::new(30.0, 40.0);
        assert_eq!(model.apply(&c), c);
    }
}
