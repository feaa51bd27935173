mod darknet;
mod head;
mod output;
mod yolo;

pub use darknet::*;
pub use head::*;
pub use output::*;
pub use yolo::*;
