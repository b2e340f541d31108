// nfchal-rs/nfchal/src/config/mod.rs

//! Configuration shadow and protocol profiles.

pub mod profiles;
pub mod shadow;

pub use profiles::{Profile, profile_for};
pub use shadow::ConfigShadow;
