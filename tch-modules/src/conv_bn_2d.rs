use crate::common::*;

/// Batch normalization starting from unit scale and zero shift.
pub fn darknet_batch_norm() -> nn::BatchNormConfig {
    nn::BatchNormConfig {
        ws_init: nn::Init::Const(1.0),
        bs_init: nn::Init::Const(0.0),
        ..Default::default()
    }
}

#[derive(Debug, Clone)]
pub struct ConvBn2DInit {
    pub in_c: usize,
    pub out_c: usize,
    pub k: usize,
    pub s: usize,
    pub p: usize,
    pub bias: bool,
    pub activation: Activation,
    pub batch_norm: Option<nn::BatchNormConfig>,
}

impl ConvBn2DInit {
    /// A darknet block: bias-free convolution, batch norm and leaky activation.
    pub fn new(in_c: usize, out_c: usize, k: usize) -> Self {
        Self {
            in_c,
            out_c,
            k,
            s: 1,
            p: k / 2,
            bias: false,
            activation: Activation::Leaky,
            batch_norm: Some(darknet_batch_norm()),
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<ConvBn2D>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let Self {
            in_c,
            out_c,
            k,
            s,
            p,
            bias,
            activation,
            batch_norm,
        } = self;

        ensure!(in_c > 0 && out_c > 0, "channels must be positive");
        ensure!(k > 0, "kernel size must be positive");
        ensure!(s > 0, "stride must be positive");

        let conv = nn::conv2d(
            path / "conv",
            in_c as i64,
            out_c as i64,
            k as i64,
            nn::ConvConfig {
                stride: s as i64,
                padding: p as i64,
                bias,
                ..Default::default()
            },
        );
        let bn = batch_norm.map(|config| nn::batch_norm2d(path / "bn", out_c as i64, config));

        Ok(ConvBn2D {
            conv,
            bn,
            activation,
        })
    }
}

/// Convolution, batch normalization and activation applied as one unit.
#[derive(Debug)]
pub struct ConvBn2D {
    conv: nn::Conv2D,
    bn: Option<nn::BatchNorm>,
    activation: Activation,
}

impl nn::ModuleT for ConvBn2D {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref conv,
            ref bn,
            activation,
        } = *self;

        let xs = xs.apply(conv);
        let xs = match bn {
            Some(bn) => xs.apply_t(bn, train),
            None => xs,
        };
        xs.activation(activation)
    }
}

impl ConvBn2D {
    pub fn conv(&self) -> &nn::Conv2D {
        &self.conv
    }

    pub fn bn(&self) -> Option<&nn::BatchNorm> {
        self.bn.as_ref()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }
}
