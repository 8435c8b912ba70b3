//! Time and location sources.
//!
//! The mount only needs three things from a source: whether it is ready, the
//! current time and the observing site. Sources that acquire these (GPS,
//! manual entry) implement [`TimeLocationSource`].

use libm::{floor, fmod};

/// Julian date of the J2000.0 epoch.
pub const J2000: f64 = 2_451_545.0;

const SECONDS_PER_HOUR: f64 = 3_600.0;

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Sidereal hours elapsed per solar hour.
const SIDEREAL_PER_SOLAR: f64 = 1.002_737_909_350_795;

/// A Julian date (UT1), held as the date at the preceding 0h UT plus the
/// hours since.
///
/// A single `f64` Julian date near 2.46e6 resolves only about 40 µs, and
/// repeatedly adding small steps to it rounds the same way every time.
/// Keeping the hour separate leaves the full mantissa for the time of day.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct JulianDate {
    /// Julian date at 0h UT.
    pub day: f64,
    /// Hours since `day`, `[0, 24)`.
    pub hour: f64,
}

impl JulianDate {
    /// A date from a day and hours, carrying whole days out of `hour`.
    pub fn new(day: f64, hour: f64) -> Self {
        let days = floor(hour / 24.0);
        Self {
            day: day + days,
            hour: hour - days * 24.0,
        }
    }

    /// Split a plain Julian date.
    pub fn from_jd(jd: f64) -> Self {
        let day = floor(jd - 0.5) + 0.5;
        Self::new(day, (jd - day) * 24.0)
    }

    /// Julian date for a Gregorian calendar date and fractional hour.
    pub fn from_gregorian(year: i32, month: u8, day: u8, hour: f64) -> Self {
        let (mut y, mut m) = (year as f64, month as f64);
        if month <= 2 {
            y -= 1.0;
            m += 12.0;
        }
        let a = floor(y / 100.0);
        let b = 2.0 - a + floor(a / 4.0);
        let jd0 = floor(365.25 * (y + 4716.0)) + floor(30.6001 * (m + 1.0)) + day as f64 + b - 1524.5;
        Self::new(jd0, hour)
    }

    /// The plain Julian date.
    pub fn jd(self) -> f64 {
        self.day + self.hour / 24.0
    }

    /// This date advanced by a number of seconds.
    pub fn add_seconds(self, seconds: f64) -> Self {
        Self::new(self.day, self.hour + seconds / SECONDS_PER_HOUR)
    }

    /// This date advanced by a number of milliseconds.
    pub fn add_millis(self, millis: u64) -> Self {
        let days = millis / MILLIS_PER_DAY;
        let rest = millis % MILLIS_PER_DAY;
        Self::new(
            self.day + days as f64,
            self.hour + rest as f64 / (SECONDS_PER_HOUR * 1000.0),
        )
    }

    /// Greenwich mean sidereal time in degrees, [0, 360).
    pub fn gmst_degrees(self) -> f64 {
        let d = self.day - J2000;
        let hours = 18.697_374_558 + 24.065_709_824_419_08 * d + SIDEREAL_PER_SOLAR * self.hour;
        let hours = fmod(hours, 24.0);
        let hours = if hours < 0.0 { hours + 24.0 } else { hours };
        hours * 15.0
    }

    /// Local sidereal time in degrees for a longitude (east positive).
    pub fn local_sidereal_time(self, longitude: f64) -> f64 {
        crate::coords::wrap_360(self.gmst_degrees() + longitude)
    }
}

/// Observing site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Site {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Elevation in meters.
    pub elevation: f64,
}

impl Site {
    /// Create a site.
    pub const fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Whether latitude and longitude are in range.
    pub fn is_valid(&self) -> bool {
        libm::fabs(self.latitude) <= 90.0 && libm::fabs(self.longitude) <= 360.0
    }
}

/// Supplier of time and site.
pub trait TimeLocationSource {
    /// True once both time and site are known.
    fn is_ready(&self) -> bool;

    /// Current time, when known.
    fn time(&self) -> Option<JulianDate>;

    /// Observing site, when known.
    fn site(&self) -> Option<Site>;
}

/// Time and site entered by the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTimeLocation {
    time: Option<JulianDate>,
    site: Option<Site>,
}

impl ManualTimeLocation {
    /// A source with nothing entered yet.
    pub const fn new() -> Self {
        Self {
            time: None,
            site: None,
        }
    }

    /// A source that is ready immediately.
    pub fn ready(time: JulianDate, site: Site) -> Self {
        Self {
            time: Some(time),
            site: Some(site),
        }
    }

    /// Enter the time.
    pub fn set_time(&mut self, time: JulianDate) {
        self.time = Some(time);
    }

    /// Enter the site. Out-of-range sites are ignored.
    pub fn set_site(&mut self, site: Site) -> bool {
        if site.is_valid() {
            self.site = Some(site);
            true
        } else {
            false
        }
    }
}

impl TimeLocationSource for ManualTimeLocation {
    fn is_ready(&self) -> bool {
        self.time.is_some() && self.site.is_some()
    }

    fn time(&self) -> Option<JulianDate> {
        self.time
    }

    fn site(&self) -> Option<Site> {
        self.site
    }
}

/// A decoded GPS fix. Sentence parsing happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Altitude above sea level in meters.
    pub altitude: f64,
    /// Horizontal dilution of precision.
    pub hdop: f64,
    /// UTC year.
    pub year: u16,
    /// UTC month, 1..=12.
    pub month: u8,
    /// UTC day, 1..=31.
    pub day: u8,
    /// UTC hour.
    pub hour: u8,
    /// UTC minute.
    pub minute: u8,
    /// UTC second.
    pub second: u8,
}

impl GpsFix {
    /// Whether the date and time fields are plausible.
    pub fn time_is_valid(&self) -> bool {
        self.year <= 3000
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
    }

    /// Whether the position fields are plausible.
    pub fn location_is_valid(&self) -> bool {
        libm::fabs(self.latitude) <= 90.0 && libm::fabs(self.longitude) <= 360.0
    }
}

/// GPS-backed time and location.
///
/// Becomes ready on the first fix whose time and position are valid and whose
/// HDOP is below the limit, then latches that fix.
#[derive(Debug, Clone, Copy)]
pub struct GpsTimeLocation {
    hdop_limit: f64,
    dut1_seconds: f64,
    time: Option<JulianDate>,
    site: Option<Site>,
}

impl GpsTimeLocation {
    /// Default HDOP readiness threshold.
    pub const DEFAULT_HDOP_LIMIT: f64 = 2.0;

    /// A source waiting for its first good fix.
    pub const fn new() -> Self {
        Self {
            hdop_limit: Self::DEFAULT_HDOP_LIMIT,
            dut1_seconds: 0.0,
            time: None,
            site: None,
        }
    }

    /// Use a different HDOP threshold.
    pub fn with_hdop_limit(mut self, hdop_limit: f64) -> Self {
        self.hdop_limit = hdop_limit;
        self
    }

    /// UT1 - UTC correction applied to fix times.
    pub fn with_dut1(mut self, dut1_seconds: f64) -> Self {
        self.dut1_seconds = dut1_seconds;
        self
    }

    /// Feed a decoded fix. Returns true when this fix made the source ready.
    pub fn update(&mut self, fix: &GpsFix) -> bool {
        if self.is_ready() {
            return false;
        }
        if !fix.time_is_valid() || !fix.location_is_valid() {
            debug!("gps fix rejected: invalid fields");
            return false;
        }
        if fix.hdop >= self.hdop_limit {
            trace!("gps fix rejected: hdop {}", fix.hdop);
            return false;
        }

        let hour = fix.hour as f64 + fix.minute as f64 / 60.0 + fix.second as f64 / 3600.0;
        let utc = JulianDate::from_gregorian(fix.year as i32, fix.month, fix.day, hour);
        self.time = Some(utc.add_seconds(self.dut1_seconds));
        self.site = Some(Site::new(fix.latitude, fix.longitude, fix.altitude));
        info!("gps time/location ready (hdop {})", fix.hdop);
        true
    }
}

impl Default for GpsTimeLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeLocationSource for GpsTimeLocation {
    fn is_ready(&self) -> bool {
        self.time.is_some() && self.site.is_some()
    }

    fn time(&self) -> Option<JulianDate> {
        self.time
    }

    fn site(&self) -> Option<Site> {
        self.site
    }
}
