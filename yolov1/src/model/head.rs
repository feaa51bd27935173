use crate::common::*;
use yolov1_config::HeadConfig;

/// Width of the hidden fully-connected layer.
pub const HIDDEN_WIDTH: usize = 4096;

/// Flatten, FC to `hidden`, dropout, activation, FC to `S * S * (C + 5B)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionHeadInit {
    /// channels of the incoming `S × S` feature map
    pub in_c: usize,
    pub config: HeadConfig,
    pub hidden: usize,
    pub dropout: R64,
    pub activation: Activation,
}

impl DetectionHeadInit {
    pub fn new(in_c: usize, config: HeadConfig) -> Self {
        Self {
            in_c,
            config,
            hidden: HIDDEN_WIDTH,
            dropout: r64(0.0),
            activation: Activation::Leaky,
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<DetectionHead>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            in_c,
            config,
            hidden,
            dropout,
            activation,
        } = self;

        config.validate()?;
        ensure!(in_c > 0, "in_c must be positive");
        ensure!(hidden > 0, "hidden must be positive");
        ensure!(
            (0.0..1.0).contains(&dropout.raw()),
            "dropout probability must be in range [0, 1)"
        );

        let in_features = config.flatten_width(in_c);
        let out_features = config.output_width();
        debug!(
            "detection head: {} -> {} -> {}",
            in_features, hidden, out_features
        );

        let fc1 = nn::linear(
            path / "fc1",
            in_features as i64,
            hidden as i64,
            Default::default(),
        );
        let fc2 = nn::linear(
            path / "fc2",
            hidden as i64,
            out_features as i64,
            Default::default(),
        );

        Ok(DetectionHead {
            config,
            fc1,
            fc2,
            dropout: dropout.raw(),
            activation,
        })
    }
}

#[derive(Debug)]
pub struct DetectionHead {
    config: HeadConfig,
    fc1: nn::Linear,
    fc2: nn::Linear,
    dropout: f64,
    activation: Activation,
}

impl DetectionHead {
    pub fn config(&self) -> &HeadConfig {
        &self.config
    }

    pub fn fc1(&self) -> &nn::Linear {
        &self.fc1
    }

    pub fn fc2(&self) -> &nn::Linear {
        &self.fc2
    }
}

impl nn::ModuleT for DetectionHead {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let Self {
            ref fc1,
            ref fc2,
            dropout,
            activation,
            ..
        } = *self;

        xs.flatten(1, -1)
            .apply(fc1)
            .dropout(dropout, train)
            .activation(activation)
            .apply(fc2)
    }
}
