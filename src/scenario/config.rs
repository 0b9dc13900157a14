//! YAML scenario files.
//!
//! ```yaml
//! name: Binary with a visitor
//! simulation:          # optional, every field optional
//!   time_step: 1800.0
//!   time_warp: 2.0
//!   scheme: verlet
//! camera:              # optional
//!   fit_margin: 0.3
//! bodies:
//!   - name: Star A
//!     mass: 1.989e30
//!     position: [-7.48e10, 0.0]
//!     velocity: [0.0, -25000.0]
//!     color: "#FDB813"
//!   - name: Star B
//!     mass: 1.989e30
//!     position: [7.48e10, 0.0]
//!     velocity: [0.0, 25000.0]
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::camera::CameraConfig;
use crate::error::SimError;
use crate::sim::body::BodySpec;
use crate::sim::state::SimConfig;

use super::Scenario;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ScenarioError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Invalid(SimError),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::Io(e) => write!(f, "cannot read scenario: {e}"),
            ScenarioError::Parse(e) => write!(f, "malformed scenario: {e}"),
            ScenarioError::Invalid(e) => write!(f, "invalid scenario: {e}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Io(e) => Some(e),
            ScenarioError::Parse(e) => Some(e),
            ScenarioError::Invalid(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e)
    }
}

impl From<serde_yaml::Error> for ScenarioError {
    fn from(e: serde_yaml::Error) -> Self {
        ScenarioError::Parse(e)
    }
}

impl From<SimError> for ScenarioError {
    fn from(e: SimError) -> Self {
        ScenarioError::Invalid(e)
    }
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub simulation: SimConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    pub bodies: Vec<BodySpec>,
}

fn default_name() -> String {
    "Custom".to_string()
}

impl ScenarioFile {
    /// Check settings and every body without touching any state.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.simulation.validate()?;
        self.camera.validate()?;
        for body in &self.bodies {
            body.validate()?;
        }
        Ok(())
    }

    pub fn scenario(&self) -> Scenario {
        Scenario {
            name: self.name.clone(),
            bodies: self.bodies.clone(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ScenarioError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Parse and validate a scenario from any reader.
pub fn parse_scenario<R: Read>(reader: R) -> Result<ScenarioFile, ScenarioError> {
    let file: ScenarioFile = serde_yaml::from_reader(reader)?;
    file.validate()?;
    Ok(file)
}

pub fn load_scenario_file(path: impl AsRef<Path>) -> Result<ScenarioFile, ScenarioError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let scenario = parse_scenario(BufReader::new(file))?;
    info!(path = %path.display(), bodies = scenario.bodies.len(), "read scenario file");
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::sim::integrator::Scheme;
    use nalgebra::Vector2;

    const BINARY: &str = r##"
name: Binary
simulation:
  time_step: 1800.0
  scheme: verlet
bodies:
  - name: Star A
    mass: 1.989e30
    position: [-7.48e10, 0.0]
    velocity: [0.0, -25000.0]
    color: "#FDB813"
  - name: Star B
    mass: 1.989e30
    position: [7.48e10, 0.0]
"##;

    #[test]
    fn parses_with_defaults() {
        let file = parse_scenario(BINARY.as_bytes()).unwrap();
        assert_eq!(file.name, "Binary");
        assert_eq!(file.simulation.time_step, 1800.0);
        assert_eq!(file.simulation.scheme, Scheme::Verlet);
        assert_eq!(file.simulation.time_warp, 1.0, "unspecified fields keep defaults");
        assert_eq!(file.camera, CameraConfig::default());
        assert_eq!(file.bodies.len(), 2);
        assert_eq!(file.bodies[1].velocity, Vector2::zeros());
        assert_eq!(file.bodies[1].color.as_str(), "#FFFFFF");
    }

    #[test]
    fn bodies_only() {
        let yaml = "bodies:\n  - name: Lone\n    mass: 1.0\n    position: [0.0, 0.0]\n";
        let file = parse_scenario(yaml.as_bytes()).unwrap();
        assert_eq!(file.name, "Custom");
        assert_eq!(file.simulation, SimConfig::default());
    }

    #[test]
    fn invalid_mass_is_rejected() {
        let yaml = "bodies:\n  - name: Bad\n    mass: -1.0\n    position: [0.0, 0.0]\n";
        match parse_scenario(yaml.as_bytes()) {
            Err(ScenarioError::Invalid(SimError::Validation(ValidationError::NonPositiveMass(m)))) => {
                assert_eq!(m, -1.0)
            }
            other => panic!("expected a mass validation error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_scenario("bodies: [".as_bytes()).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)), "got {err}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_scenario_file("/nonexistent/scenario.yaml").unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }

    #[test]
    fn yaml_round_trip_preserves_bodies() {
        let file = parse_scenario(BINARY.as_bytes()).unwrap();
        let text = file.to_yaml().unwrap();
        let again = parse_scenario(text.as_bytes()).unwrap();
        assert_eq!(again, file);
    }
}
