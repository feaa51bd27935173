use crate::common::*;

/// Number of values predicted for each box: x, y, w, h and confidence.
pub const BOX_PARAMS: usize = 5;

/// The prediction grid layout of the detection head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeadConfig {
    /// grid split size `S`
    pub split_size: usize,
    /// boxes per cell `B`
    pub num_boxes: usize,
    /// object classes `C`
    pub num_classes: usize,
}

impl Default for HeadConfig {
    /// The PASCAL VOC configuration, `S = 7, B = 2, C = 20`.
    fn default() -> Self {
        Self {
            split_size: 7,
            num_boxes: 2,
            num_classes: 20,
        }
    }
}

impl HeadConfig {
    pub fn new(split_size: usize, num_boxes: usize, num_classes: usize) -> Self {
        Self {
            split_size,
            num_boxes,
            num_classes,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            split_size,
            num_boxes,
            num_classes,
        } = *self;
        ensure!(split_size > 0, "split_size must be positive");
        ensure!(num_boxes > 0, "num_boxes must be positive");
        ensure!(num_classes > 0, "num_classes must be positive");
        Ok(())
    }

    pub fn num_cells(&self) -> usize {
        self.split_size * self.split_size
    }

    /// Values per grid cell, `C + 5 * B`.
    pub fn cell_width(&self) -> usize {
        self.num_classes + BOX_PARAMS * self.num_boxes
    }

    /// Width of the final linear layer, `S * S * (C + 5 * B)`.
    pub fn output_width(&self) -> usize {
        self.num_cells() * self.cell_width()
    }

    /// Width of the flattened `channels × S × S` feature map.
    pub fn flatten_width(&self, channels: usize) -> usize {
        channels * self.num_cells()
    }
}
