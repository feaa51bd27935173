//! Declarative YOLOv1 architecture description and its interpreter.
//!
//! An [Architecture] is an ordered list of [ArchItem]s. [interpret] walks the
//! list once, threading the channel count through every convolution, and
//! produces the [LayerDescriptor]s that the `tch` modules are built from.

mod common;
pub mod arch;
pub mod conv;
pub mod descriptor;
pub mod head;
pub mod model;
pub mod zoo;

pub use arch::*;
pub use conv::*;
pub use descriptor::*;
pub use head::*;
pub use model::*;
pub use zoo::*;
