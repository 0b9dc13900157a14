pub mod constants;
pub mod gravity;

pub use constants::*;
pub use gravity::{accelerations, center_of_mass};
