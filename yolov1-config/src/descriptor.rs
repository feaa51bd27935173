use crate::{common::*, conv::ConvBlock};

/// A resolved layer of the darknet body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LayerDescriptor {
    ConvBn2D(ConvBlock),
    MaxPool(MaxPool),
}

impl From<ConvBlock> for LayerDescriptor {
    fn from(v: ConvBlock) -> Self {
        Self::ConvBn2D(v)
    }
}

impl From<MaxPool> for LayerDescriptor {
    fn from(v: MaxPool) -> Self {
        Self::MaxPool(v)
    }
}

impl LayerDescriptor {
    pub fn conv_bn_2d(&self) -> Option<&ConvBlock> {
        match self {
            Self::ConvBn2D(block) => Some(block),
            _ => None,
        }
    }

    pub fn output_channels(&self, in_c: usize) -> usize {
        match self {
            Self::ConvBn2D(block) => block.out_c,
            Self::MaxPool(_) => in_c,
        }
    }

    pub fn output_size(&self, input_size: [usize; 2]) -> Option<[usize; 2]> {
        match self {
            Self::ConvBn2D(block) => block.output_size(input_size),
            Self::MaxPool(pool) => pool.output_size(input_size),
        }
    }
}

/// Max pooling without padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaxPool {
    pub k: usize,
    pub s: usize,
}

impl Default for MaxPool {
    fn default() -> Self {
        Self { k: 2, s: 2 }
    }
}

impl MaxPool {
    pub fn output_size(&self, [in_h, in_w]: [usize; 2]) -> Option<[usize; 2]> {
        let Self { k, s } = *self;
        let out = |len: usize| Some(len.checked_sub(k)? / s + 1);
        Some([out(in_h)?, out(in_w)?])
    }
}

/// Channels, height and width of a feature map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureShape {
    pub c: usize,
    pub h: usize,
    pub w: usize,
}

impl Display for FeatureShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", [self.c, self.h, self.w].iter().join(", "))
    }
}

/// Check that each convolution consumes the channels produced before it.
///
/// Returns the number of channels of the final feature map.
pub fn check_wiring(layers: &[LayerDescriptor], input_channels: usize) -> Result<usize> {
    layers
        .iter()
        .enumerate()
        .try_fold(input_channels, |in_c, (index, layer)| {
            if let LayerDescriptor::ConvBn2D(block) = layer {
                ensure!(
                    block.in_c == in_c,
                    "layer {} expects {} input channels, but the previous layer produces {}",
                    index,
                    block.in_c,
                    in_c
                );
            }
            Ok(layer.output_channels(in_c))
        })
}

/// Compute the output shape of every layer for an input of the given height and width.
pub fn feature_shapes(
    layers: &[LayerDescriptor],
    input_channels: usize,
    [in_h, in_w]: [usize; 2],
) -> Result<Vec<FeatureShape>> {
    let input = FeatureShape {
        c: input_channels,
        h: in_h,
        w: in_w,
    };

    let (shapes, _) = layers.iter().enumerate().try_fold(
        (Vec::with_capacity(layers.len()), input),
        |(mut shapes, input), (index, layer)| -> Result<_> {
            let FeatureShape { c, h, w } = input;
            let [out_h, out_w] = layer_output_size(index, layer, [h, w])?;
            let output = FeatureShape {
                c: layer.output_channels(c),
                h: out_h,
                w: out_w,
            };
            shapes.push(output);
            Ok((shapes, output))
        },
    )?;

    Ok(shapes)
}

/// Check that the layers map an input of the given size onto a `split_size × split_size` grid.
pub fn check_final_size(
    layers: &[LayerDescriptor],
    input_size: [usize; 2],
    split_size: usize,
) -> Result<()> {
    ensure!(!layers.is_empty(), "architecture must not be empty");

    let [h, w] = layers
        .iter()
        .enumerate()
        .try_fold(input_size, |size, (index, layer)| {
            layer_output_size(index, layer, size)
        })?;
    let [in_h, in_w] = input_size;
    ensure!(
        h == split_size && w == split_size,
        "a {}x{} input produces a {}x{} feature map, but the head expects {}x{}",
        in_h,
        in_w,
        h,
        w,
        split_size,
        split_size
    );
    Ok(())
}

fn layer_output_size(
    index: usize,
    layer: &LayerDescriptor,
    [h, w]: [usize; 2],
) -> Result<[usize; 2]> {
    layer.output_size([h, w]).ok_or_else(|| {
        format_err!(
            "{} layer {} cannot be applied to a {}x{} feature map",
            layer.as_ref(),
            index,
            h,
            w
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{conv::ConvSpec, zoo::yolo_v1_architecture};

    #[test]
    fn detect_broken_wiring() {
        let layers: Vec<LayerDescriptor> = vec![
            ConvSpec::new(3, 16, 1, 1).block(3).into(),
            MaxPool::default().into(),
            ConvSpec::new(3, 32, 1, 1).block(8).into(),
        ];
        let err = check_wiring(&layers, 3).unwrap_err();
        assert!(format!("{}", err).contains("layer 2"));
    }

    #[test]
    fn reference_feature_shapes() -> Result<()> {
        let layers = yolo_v1_architecture().interpret(3);
        let shapes = feature_shapes(&layers, 3, [448, 448])?;

        assert_eq!(shapes.len(), layers.len());
        assert_eq!(shapes[0], FeatureShape { c: 64, h: 224, w: 224 });
        assert_eq!(shapes[1], FeatureShape { c: 64, h: 112, w: 112 });
        assert_eq!(
            shapes.last().copied(),
            Some(FeatureShape {
                c: 1024,
                h: 7,
                w: 7
            })
        );
        Ok(())
    }

    #[test]
    fn collapsed_feature_map_is_an_error() {
        let layers = yolo_v1_architecture().interpret(3);
        assert!(feature_shapes(&layers, 3, [8, 8]).is_err());
    }

    #[test]
    fn final_size_matches_the_grid() -> Result<()> {
        let layers = yolo_v1_architecture().interpret(3);
        check_final_size(&layers, [448, 448], 7)?;
        check_final_size(&layers, [896, 896], 14)?;

        let err = check_final_size(&layers, [448, 448], 14).unwrap_err();
        assert!(format!("{}", err).contains("7x7"));

        let err = check_final_size(&layers, [8, 8], 7).unwrap_err();
        assert!(format!("{}", err).contains("cannot be applied"));

        assert!(check_final_size(&[], [448, 448], 7).is_err());
        Ok(())
    }

    #[test]
    fn max_pool_floors_odd_sizes() {
        let pool = MaxPool::default();
        assert_eq!(pool.output_size([7, 8]), Some([3, 4]));
        assert_eq!(pool.output_size([1, 1]), None);
    }

    #[test]
    fn feature_shape_display() {
        let shape = FeatureShape { c: 1024, h: 7, w: 7 };
        assert_eq!(format!("{}", shape), "[1024, 7, 7]");
    }
}
