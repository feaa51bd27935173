pub use anyhow::{ensure, format_err, Context as _, Error, Result};
pub use itertools::Itertools as _;
pub use serde::{Deserialize, Serialize};
pub use std::{
    fmt::{self, Display, Formatter},
    iter,
    ops::Deref,
    path::Path,
};
pub use strum::AsRefStr;
