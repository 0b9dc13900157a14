// ---------------------------------------------------------------------------
// Physical constants (SI units)
// ---------------------------------------------------------------------------

pub const G: f64 = 6.674_30e-11; // m^3 kg^-1 s^-2
pub const AU: f64 = 1.495_978_707e11; // m

pub const SOLAR_MASS: f64 = 1.989e30; // kg
pub const EARTH_MASS: f64 = 5.972e24; // kg
pub const JUPITER_MASS: f64 = 1.898e27; // kg

pub const MOON_MASS: f64 = EARTH_MASS * 0.0123;
pub const MERCURY_MASS: f64 = EARTH_MASS * 0.055;
pub const VENUS_MASS: f64 = EARTH_MASS * 0.815;
pub const MARS_MASS: f64 = EARTH_MASS * 0.107;
pub const SATURN_MASS: f64 = JUPITER_MASS * 0.299;
pub const URANUS_MASS: f64 = EARTH_MASS * 14.536;
pub const NEPTUNE_MASS: f64 = EARTH_MASS * 17.147;

// Galilean moons
pub const IO_MASS: f64 = EARTH_MASS * 0.015;
pub const EUROPA_MASS: f64 = EARTH_MASS * 0.008;
pub const GANYMEDE_MASS: f64 = EARTH_MASS * 0.025;
pub const CALLISTO_MASS: f64 = EARTH_MASS * 0.018;

// Radii, display only
pub const SOLAR_RADIUS: f64 = 6.96e8; // m
pub const EARTH_RADIUS: f64 = 6.371e6; // m
pub const JUPITER_RADIUS: f64 = 6.9911e7; // m

/// Seconds per day / per Julian year, used for elapsed-time display.
pub const DAY: f64 = 86_400.0;
pub const YEAR: f64 = DAY * 365.25;
