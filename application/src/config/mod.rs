//! Application-level configuration.
//!
//! - [`AdapterParams`]: adapter loop control (round limit, temperature)

pub mod adapter_params;

pub use adapter_params::AdapterParams;
