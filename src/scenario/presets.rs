use std::fmt;
use std::str::FromStr;

use crate::error::{SimError, ValidationError};
use crate::physics::constants::*;

use super::{Scenario, ScenarioBuilder};

// ---------------------------------------------------------------------------
// Preset scenarios
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    SolarSystem,
    EarthMoon,
    JupiterMoons,
    ThreeBodyProblem,
    AlphaCentauri,
    BinaryStars,
    Figure8,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::SolarSystem,
        Preset::EarthMoon,
        Preset::JupiterMoons,
        Preset::ThreeBodyProblem,
        Preset::AlphaCentauri,
        Preset::BinaryStars,
        Preset::Figure8,
    ];

    /// Identifier accepted by `FromStr` and the CLI.
    pub fn id(self) -> &'static str {
        match self {
            Preset::SolarSystem => "solar_system",
            Preset::EarthMoon => "earth_moon",
            Preset::JupiterMoons => "jupiter_moons",
            Preset::ThreeBodyProblem => "three_body_problem",
            Preset::AlphaCentauri => "alpha_centauri",
            Preset::BinaryStars => "binary_stars",
            Preset::Figure8 => "figure_8",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Preset::SolarSystem => "Solar System",
            Preset::EarthMoon => "Earth & Moon",
            Preset::JupiterMoons => "Jupiter & Moons",
            Preset::ThreeBodyProblem => "Three-Body Problem",
            Preset::AlphaCentauri => "Alpha Centauri",
            Preset::BinaryStars => "Binary Stars",
            Preset::Figure8 => "Figure-8",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::SolarSystem => "Sun, 8 planets, and Earth's moon",
            Preset::EarthMoon => "Earth-Moon system orbiting the Sun",
            Preset::JupiterMoons => "Jupiter with its 4 Galilean moons",
            Preset::ThreeBodyProblem => "3 suns with a planet",
            Preset::AlphaCentauri => "Triple star system",
            Preset::BinaryStars => "Two stars orbiting each other",
            Preset::Figure8 => "Stable three-body choreography",
        }
    }

    pub fn scenario(self) -> Scenario {
        match self {
            Preset::SolarSystem => solar_system(),
            Preset::EarthMoon => earth_moon(),
            Preset::JupiterMoons => jupiter_moons(),
            Preset::ThreeBodyProblem => three_body_problem(),
            Preset::AlphaCentauri => alpha_centauri(),
            Preset::BinaryStars => binary_stars(),
            Preset::Figure8 => figure_8(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Preset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Preset::ALL
            .into_iter()
            .find(|p| p.id() == key || p.id().replace('_', "") == key)
            .ok_or_else(|| ValidationError::UnknownPreset(s.to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// Literal scenarios
// ---------------------------------------------------------------------------

const MOON_DISTANCE: f64 = 3.844e8; // m from Earth
const EARTH_SPEED: f64 = 29_780.0; // m/s
const JUPITER_DISTANCE: f64 = 5.203 * AU;
const JUPITER_SPEED: f64 = 13_070.0;

pub fn solar_system() -> Scenario {
    ScenarioBuilder::new("Solar System")
        .body("Sun", SOLAR_MASS, 0.0, 0.0, 0.0, 0.0, "#FDB813")
        .body("Mercury", MERCURY_MASS, 0.387 * AU, 0.0, 0.0, 47_870.0, "#8C7853")
        .body("Venus", VENUS_MASS, 0.723 * AU, 0.0, 0.0, 35_020.0, "#FFC649")
        .body("Earth", EARTH_MASS, AU, 0.0, 0.0, EARTH_SPEED, "#4A90E2")
        .body("Moon", MOON_MASS, AU + MOON_DISTANCE, 0.0, 0.0, EARTH_SPEED + 1022.0, "#CCCCCC")
        .body("Mars", MARS_MASS, 1.524 * AU, 0.0, 0.0, 24_070.0, "#E27B58")
        .body("Jupiter", JUPITER_MASS, JUPITER_DISTANCE, 0.0, 0.0, JUPITER_SPEED, "#C88B3A")
        .body("Saturn", SATURN_MASS, 9.537 * AU, 0.0, 0.0, 9_690.0, "#F4D03F")
        .body("Uranus", URANUS_MASS, 19.191 * AU, 0.0, 0.0, 6_800.0, "#4FC3F7")
        .body("Neptune", NEPTUNE_MASS, 30.069 * AU, 0.0, 0.0, 5_430.0, "#5C6BC0")
        .build()
}

pub fn earth_moon() -> Scenario {
    ScenarioBuilder::new("Earth & Moon")
        .body("Sun", SOLAR_MASS, 0.0, 0.0, 0.0, 0.0, "#FDB813")
        .body("Earth", EARTH_MASS, AU, 0.0, 0.0, EARTH_SPEED, "#4A90E2")
        .body("Moon", MOON_MASS, AU + MOON_DISTANCE, 0.0, 0.0, EARTH_SPEED + 1022.0, "#CCCCCC")
        .build()
}

pub fn jupiter_moons() -> Scenario {
    let x = JUPITER_DISTANCE;
    let v = JUPITER_SPEED;
    ScenarioBuilder::new("Jupiter & Moons")
        .body("Sun", SOLAR_MASS, 0.0, 0.0, 0.0, 0.0, "#FDB813")
        .body("Jupiter", JUPITER_MASS, x, 0.0, 0.0, v, "#C88B3A")
        .body("Io", IO_MASS, x + 4.217e8, 0.0, 0.0, v + 17_334.0, "#FFF59D")
        .body("Europa", EUROPA_MASS, x + 6.709e8, 0.0, 0.0, v + 13_740.0, "#BCAAA4")
        .body("Ganymede", GANYMEDE_MASS, x + 1.0704e9, 0.0, 0.0, v + 10_880.0, "#E0E0E0")
        .body("Callisto", CALLISTO_MASS, x + 1.8827e9, 0.0, 0.0, v + 8_204.0, "#9E9E9E")
        .build()
}

/// Close binary, a distant third star and a circumbinary planet.
pub fn three_body_problem() -> Scenario {
    ScenarioBuilder::new("Three-Body Problem")
        .body("Alpha", SOLAR_MASS, -0.3 * AU, 0.0, 0.0, -30_000.0, "#FDB813")
        .body("Beta", SOLAR_MASS, 0.3 * AU, 0.0, 0.0, 30_000.0, "#FF6B35")
        .body("Gamma", 0.8 * SOLAR_MASS, 0.0, 6.0 * AU, -6_500.0, 0.0, "#FF0000")
        .body("Trisolaris", 2.0 * EARTH_MASS, 2.2 * AU, 0.0, 0.0, 22_000.0, "#4A90E2")
        .build()
}

pub fn alpha_centauri() -> Scenario {
    ScenarioBuilder::new("Alpha Centauri")
        .body("Alpha Cen A", 1.1 * SOLAR_MASS, -11.2 * AU, 0.0, 0.0, -22_000.0, "#FFF9C4")
        .body("Alpha Cen B", 0.907 * SOLAR_MASS, 11.8 * AU, 0.0, 0.0, 23_000.0, "#FFE082")
        .body("Proxima Cen", 0.123 * SOLAR_MASS, 0.0, 8000.0 * AU, -500.0, 0.0, "#EF5350")
        .build()
}

pub fn binary_stars() -> Scenario {
    let half = 0.5 * AU;
    let v = 25_000.0;
    ScenarioBuilder::new("Binary Stars")
        .body("Star A", SOLAR_MASS, -half, 0.0, 0.0, -v, "#FDB813")
        .body("Star B", SOLAR_MASS, half, 0.0, 0.0, v, "#FF6B35")
        .build()
}

pub fn figure_8() -> Scenario {
    ScenarioBuilder::new("Figure-8")
        .body("Body 1", SOLAR_MASS, -AU, 0.0, 0.0, -15_000.0, "#FDB813")
        .body("Body 2", SOLAR_MASS, AU, 0.0, 0.0, 17_500.0, "#FF6B35")
        .body("Body 3", SOLAR_MASS, 0.0, 1.5 * AU, -20_000.0, 0.0, "#FF0000")
        .build()
}
