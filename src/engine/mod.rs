pub mod bridge;
pub mod layout;
pub mod params;
pub mod perturb;
pub mod preview;
pub mod wrap;
