//! `tch` building blocks of the darknet body.

mod common;
pub mod conv_bn_2d;
pub mod max_pool_2d;
pub mod module;

pub use conv_bn_2d::*;
pub use max_pool_2d::*;
pub use module::*;
