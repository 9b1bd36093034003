//! Configuration module.

mod mix_config;

pub use mix_config::{Behavior, MixConfig, Units};
