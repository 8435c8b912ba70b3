//! Site clock: time latched from the source and advanced by the monitor.
//!
//! The latched epoch is never modified; elapsed time is counted in whole
//! milliseconds and added to it when the time is read.

use crate::tls::{JulianDate, Site, TimeLocationSource};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SiteClock {
    epoch: Option<JulianDate>,
    elapsed_ms: u64,
    site: Option<Site>,
}

impl SiteClock {
    pub(crate) const fn new() -> Self {
        Self {
            epoch: None,
            elapsed_ms: 0,
            site: None,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.epoch.is_some() && self.site.is_some()
    }

    /// Take time and site from a ready source. A time different from the
    /// latched epoch (the operator entered a new one) restarts the clock.
    /// Returns the site when this call latched or changed it.
    pub(crate) fn latch<S: TimeLocationSource>(&mut self, tls: &S) -> Option<Site> {
        if !tls.is_ready() {
            return None;
        }
        let (time, site) = (tls.time()?, tls.site()?);
        if self.epoch != Some(time) {
            if self.epoch.is_some() {
                info!("clock reset from time source");
            }
            self.epoch = Some(time);
            self.elapsed_ms = 0;
        }
        if self.site == Some(site) {
            return None;
        }
        self.site = Some(site);
        Some(site)
    }

    pub(crate) fn advance_ms(&mut self, millis: u64) {
        if self.epoch.is_some() {
            self.elapsed_ms = self.elapsed_ms.saturating_add(millis);
        }
    }

    /// Current time.
    pub(crate) fn now(&self) -> Option<JulianDate> {
        self.epoch.map(|epoch| epoch.add_millis(self.elapsed_ms))
    }

    /// Local sidereal time in degrees.
    pub(crate) fn lst(&self) -> Option<f64> {
        let (now, site) = (self.now()?, self.site?);
        Some(now.local_sidereal_time(site.longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::normalize_degrees;
    use crate::tls::{ManualTimeLocation, J2000};

    // Sidereal degrees per solar second
    const SIDEREAL_RATE: f64 = 360.985_647_366_29 / 86_400.0;

    fn ready_clock() -> SiteClock {
        let mut tls = ManualTimeLocation::new();
        tls.set_time(JulianDate::from_gregorian(2024, 9, 21, 21.0));
        tls.set_site(Site::new(45.0, 7.0, 0.0));
        let mut clock = SiteClock::new();
        clock.latch(&tls);
        clock
    }

    #[test]
    fn test_latch_once_and_advance() {
        let mut tls = ManualTimeLocation::new();
        let mut clock = SiteClock::new();
        assert!(clock.latch(&tls).is_none());

        tls.set_time(JulianDate::from_jd(J2000));
        tls.set_site(Site::new(45.0, 0.0, 0.0));
        assert!(clock.latch(&tls).is_some());
        assert!(clock.latch(&tls).is_none());

        let before = clock.lst().unwrap();
        // one sidereal hour is slightly shorter than a solar hour
        clock.advance_ms(3_590_170);
        let after = clock.lst().unwrap();
        assert!((after - before - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_no_drift_over_an_hour_of_short_ticks() {
        let mut clock = ready_clock();
        let before = clock.lst().unwrap();
        for _ in 0..360_000 {
            clock.advance_ms(10);
        }
        let after = clock.lst().unwrap();
        let error = normalize_degrees(after - before - 3_600.0 * SIDEREAL_RATE);
        assert!(error.abs() < 1.0 / 3_600.0, "error {} arcsec", error * 3_600.0);
    }

    #[test]
    fn test_new_source_time_restarts_clock() {
        let mut tls = ManualTimeLocation::new();
        let start = JulianDate::from_gregorian(2024, 9, 21, 21.0);
        tls.set_time(start);
        tls.set_site(Site::new(45.0, 0.0, 0.0));
        let mut clock = SiteClock::new();
        clock.latch(&tls);
        clock.advance_ms(60_000);
        assert_eq!(clock.now(), Some(start.add_millis(60_000)));

        // unchanged source time keeps the elapsed count
        assert!(clock.latch(&tls).is_none());
        assert_eq!(clock.now(), Some(start.add_millis(60_000)));

        let entered = JulianDate::from_gregorian(2024, 9, 21, 22.0);
        tls.set_time(entered);
        clock.latch(&tls);
        assert_eq!(clock.now(), Some(entered));
    }
}
