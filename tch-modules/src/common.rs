pub use anyhow::{ensure, Result};
pub use std::borrow::Borrow;
pub use strum::AsRefStr;
pub use tch::{
    nn::{self, Module as _, ModuleT as _},
    Tensor,
};
pub use tch_act::{Activation, TensorActivationExt as _};
