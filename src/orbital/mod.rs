pub mod maneuvers;

pub use maneuvers::{circular_orbit_speed, escape_speed, orbital_velocity_vector};
