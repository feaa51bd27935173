use super::{
    darknet::{Darknet, DarknetInit},
    head::{DetectionHead, DetectionHeadInit, HIDDEN_WIDTH},
    output::YoloV1Output,
};
use crate::common::*;
use yolov1_config::{check_final_size, HeadConfig, ModelConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoloV1Init {
    pub config: ModelConfig,
    #[serde(default = "default_hidden")]
    pub hidden: usize,
    #[serde(default = "default_dropout")]
    pub dropout: R64,
}

impl From<ModelConfig> for YoloV1Init {
    fn from(config: ModelConfig) -> Self {
        Self {
            config,
            hidden: default_hidden(),
            dropout: default_dropout(),
        }
    }
}

impl YoloV1Init {
    pub fn build<'p, P>(self, path: P) -> Result<YoloV1>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            config,
            hidden,
            dropout,
        } = self;

        config.validate()?;

        let layers = config.layers();
        let num_layers = layers.len();
        let darknet = DarknetInit::new(config.input_channels, layers).build(path / "darknet")?;
        let head = DetectionHeadInit {
            hidden,
            dropout,
            ..DetectionHeadInit::new(darknet.output_channels(), config.head)
        }
        .build(path / "fcs")?;

        let HeadConfig {
            split_size,
            num_boxes,
            num_classes,
        } = config.head;
        info!(
            "built YOLOv1 with {} darknet layers, {} output channels and a {}x{} grid of {} boxes and {} classes",
            num_layers,
            darknet.output_channels(),
            split_size,
            split_size,
            num_boxes,
            num_classes
        );

        Ok(YoloV1 {
            config,
            darknet,
            head,
        })
    }
}

#[derive(Debug)]
pub struct YoloV1 {
    config: ModelConfig,
    darknet: Darknet,
    head: DetectionHead,
}

impl YoloV1 {
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn darknet(&self) -> &Darknet {
        &self.darknet
    }

    pub fn head(&self) -> &DetectionHead {
        &self.head
    }

    /// Run the model on a `N × C_in × H × W` batch and return `N × S*S*(C+5B)` predictions.
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let (_batch_size, in_c, in_h, in_w) = xs.size4()?;
        let input_channels = self.darknet.input_channels();
        ensure!(
            in_c as usize == input_channels,
            "expect {} input channels, but get {}",
            input_channels,
            in_c
        );
        check_final_size(
            self.darknet.layers(),
            [in_h as usize, in_w as usize],
            self.config.head.split_size,
        )?;

        let features = self.darknet.forward_t(xs, train);
        let output = self.head.forward_t(&features, train);
        Ok(output)
    }

    /// View the flat output as a prediction grid.
    pub fn output(&self, output: &Tensor) -> Result<YoloV1Output> {
        YoloV1Output::new(output, self.config.head)
    }
}

fn default_hidden() -> usize {
    HIDDEN_WIDTH
}

fn default_dropout() -> R64 {
    r64(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{kind::FLOAT_CPU, Device};
    use yolov1_config::{ArchItem, Architecture, ConvSpec, RepeatGroup};

    fn small_config(head: HeadConfig) -> ModelConfig {
        ModelConfig {
            input_channels: 3,
            architecture: Architecture::new([
                ConvSpec::new(3, 8, 2, 1).into(),
                ArchItem::MaxPool,
                RepeatGroup::new(ConvSpec::new(1, 4, 1, 0), ConvSpec::new(3, 8, 1, 1), 2).into(),
                ConvSpec::new(3, 16, 2, 1).into(),
            ]),
            head,
        }
    }

    #[test]
    fn small_model_forward() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let init = YoloV1Init {
            hidden: 64,
            ..small_config(HeadConfig::new(4, 2, 3)).into()
        };
        let model = init.build(&vs.root())?;

        let input = Tensor::randn(&[2, 3, 32, 32], FLOAT_CPU);
        let output = model.forward_t(&input, true)?;
        assert_eq!(output.size(), [2, 16 * 13]);

        let grid = model.output(&output)?;
        assert_eq!(grid.grid().size(), [2, 4, 4, 13]);
        Ok(())
    }

    #[test]
    fn head_config_changes_only_head() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let lhs: YoloV1Init = small_config(HeadConfig::new(4, 2, 3)).into();
        let rhs: YoloV1Init = small_config(HeadConfig::new(2, 1, 5)).into();
        let lhs = YoloV1Init { hidden: 16, ..lhs }.build(&vs.root() / "lhs")?;
        let rhs = YoloV1Init { hidden: 16, ..rhs }.build(&vs.root() / "rhs")?;

        assert_eq!(lhs.darknet().layers(), rhs.darknet().layers());
        assert_eq!(lhs.darknet().modules().len(), rhs.darknet().modules().len());
        assert_eq!(lhs.head().fc1().ws.size(), [16, 16 * 4 * 4]);
        assert_eq!(rhs.head().fc1().ws.size(), [16, 16 * 2 * 2]);
        assert_eq!(lhs.head().fc2().ws.size(), [16 * 13, 16]);
        assert_eq!(rhs.head().fc2().ws.size(), [4 * 10, 16]);
        Ok(())
    }

    #[test]
    fn reject_mismatched_input() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let init = YoloV1Init {
            hidden: 16,
            ..small_config(HeadConfig::new(4, 2, 3)).into()
        };
        let model = init.build(&vs.root())?;

        let wrong_channels = Tensor::randn(&[1, 1, 32, 32], FLOAT_CPU);
        assert!(model.forward_t(&wrong_channels, false).is_err());

        let wrong_size = Tensor::randn(&[1, 3, 64, 64], FLOAT_CPU);
        assert!(model.forward_t(&wrong_size, false).is_err());
        Ok(())
    }

    #[test]
    fn forward_checks_built_layers() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let init = YoloV1Init {
            hidden: 16,
            ..small_config(HeadConfig::new(4, 2, 3)).into()
        };
        let model = init.build(&vs.root())?;
        assert_eq!(model.darknet().layers(), model.config().layers());
        assert_eq!(model.darknet().input_channels(), 3);

        let tiny = Tensor::randn(&[1, 3, 2, 2], FLOAT_CPU);
        let err = model.forward_t(&tiny, false).unwrap_err();
        assert!(format!("{}", err).contains("cannot be applied"));

        let mismatched = Tensor::randn(&[1, 3, 16, 16], FLOAT_CPU);
        let err = model.forward_t(&mismatched, false).unwrap_err();
        assert!(format!("{}", err).contains("2x2 feature map"));
        Ok(())
    }

    #[test]
    fn yolo_v1_init_serde() -> Result<()> {
        let init: YoloV1Init = small_config(HeadConfig::default()).into();
        let text = serde_json::to_string_pretty(&init)?;
        let recovered: YoloV1Init = serde_json::from_str(&text)?;
        assert_eq!(init, recovered);
        Ok(())
    }
}
