//! Activation functions shared by the model configuration and the `tch` modules.

#[cfg(feature = "tch")]
pub use impls::*;
#[cfg(feature = "tch")]
mod impls;

#[cfg(feature = "tch")]
pub use r#trait::*;
#[cfg(feature = "tch")]
mod r#trait;

/// The negative slope of the darknet [Activation::Leaky] rectifier.
pub const LEAKY_SLOPE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Activation {
    /// Leaky rectifier with negative slope 0.1.
    Leaky,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Leaky
    }
}
