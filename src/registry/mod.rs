pub mod profile;
pub mod dtsu666;

pub use profile::{round_to, ParameterSpec, Profile, ProfileRegistry};
