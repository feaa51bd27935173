use crate::{impls, Activation};
use tch::{nn::Module, Tensor};

pub trait TensorActivationExt {
    fn activation(&self, act: Activation) -> Tensor;

    /// Leaky rectifier with the darknet slope 0.1.
    fn leaky(&self) -> Tensor;
}

impl TensorActivationExt for Tensor {
    fn activation(&self, act: Activation) -> Tensor {
        act.forward(self)
    }

    fn leaky(&self) -> Tensor {
        impls::leaky(self)
    }
}
