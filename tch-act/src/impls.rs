use crate::{Activation, LEAKY_SLOPE};
use tch::{nn, Tensor};

impl nn::Module for Activation {
    fn forward(&self, xs: &Tensor) -> Tensor {
        match *self {
            Activation::Leaky => leaky(xs),
        }
    }
}

pub fn leaky(xs: &Tensor) -> Tensor {
    xs.maximum(&(xs * LEAKY_SLOPE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{kind::FLOAT_CPU, nn::Module as _};

    #[test]
    fn leaky_scales_negative_values() {
        let input = Tensor::of_slice(&[-2.0f32, -0.5, 0.0, 3.0]);
        let output = Activation::Leaky.forward(&input);
        let expect = Tensor::of_slice(&[-0.2f32, -0.05, 0.0, 3.0]);
        assert!(output.allclose(&expect, 1e-6, 1e-6, false));
    }

    #[test]
    fn leaky_keeps_positive_values() {
        let input = Tensor::rand(&[16], FLOAT_CPU) + 0.1;
        let output = Activation::Leaky.forward(&input);
        assert!(output.allclose(&input, 1e-6, 1e-6, false));
    }

    #[test]
    fn default_is_leaky() {
        assert_eq!(Activation::default(), Activation::Leaky);
    }
}
