//! YOLOv1: a darknet convolutional body followed by a fully-connected detection head.

mod common;
pub mod model;

pub use model::*;
pub use yolov1_config as config;
