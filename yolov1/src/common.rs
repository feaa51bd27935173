pub use anyhow::{ensure, Context as _, Result};
pub use log::{debug, info};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::borrow::Borrow;
pub use tch::{
    nn::{self, ModuleT as _},
    Tensor,
};
pub use tch_act::{Activation, TensorActivationExt as _};
