use crate::common::*;
use yolov1_config::{HeadConfig, BOX_PARAMS};

/// The flat head output viewed as an `S × S` prediction grid.
#[derive(Debug)]
pub struct YoloV1Output {
    config: HeadConfig,
    grid: Tensor,
}

impl YoloV1Output {
    /// Reshape a `N × S*S*(C+5B)` tensor into `N × S × S × (C+5B)`.
    pub fn new(output: &Tensor, config: HeadConfig) -> Result<Self> {
        let (batch_size, width) = output.size2()?;
        ensure!(
            width as usize == config.output_width(),
            "expect output width {}, but get {}",
            config.output_width(),
            width
        );

        let s = config.split_size as i64;
        let grid = output.view([batch_size, s, s, config.cell_width() as i64]);
        Ok(Self { config, grid })
    }

    pub fn config(&self) -> &HeadConfig {
        &self.config
    }

    pub fn batch_size(&self) -> i64 {
        self.grid.size()[0]
    }

    /// The grid tensor in shape `N × S × S × (C+5B)`.
    pub fn grid(&self) -> &Tensor {
        &self.grid
    }

    /// Class scores in shape `N × S × S × C`.
    pub fn class_scores(&self) -> Tensor {
        let num_classes = self.config.num_classes as i64;
        self.grid.narrow(3, 0, num_classes)
    }

    /// Box parameters in shape `N × S × S × B × 5`.
    pub fn boxes(&self) -> Tensor {
        let HeadConfig {
            split_size,
            num_boxes,
            num_classes,
        } = self.config;
        let s = split_size as i64;

        self.grid
            .narrow(3, num_classes as i64, (num_boxes * BOX_PARAMS) as i64)
            .reshape(&[self.batch_size(), s, s, num_boxes as i64, BOX_PARAMS as i64])
    }
}
