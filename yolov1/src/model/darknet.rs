use crate::common::*;
use tch_modules::{darknet_batch_norm, ConvBn2DInit, MaxPool2DInit, Module, ModuleInit};
use yolov1_config::{check_wiring, ConvBlock, LayerDescriptor, MaxPool};

/// Builds the convolutional body from interpreted layer descriptors.
#[derive(Debug, Clone)]
pub struct DarknetInit {
    pub input_channels: usize,
    pub layers: Vec<LayerDescriptor>,
    pub activation: Activation,
    pub batch_norm: nn::BatchNormConfig,
}

impl DarknetInit {
    pub fn new(input_channels: usize, layers: Vec<LayerDescriptor>) -> Self {
        Self {
            input_channels,
            layers,
            activation: Activation::Leaky,
            batch_norm: darknet_batch_norm(),
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<Darknet>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            input_channels,
            layers,
            activation,
            batch_norm,
        } = self;

        // reject the description before any parameter is allocated
        ensure!(!layers.is_empty(), "darknet must have at least one layer");
        let output_channels = check_wiring(&layers, input_channels)?;

        let modules: Vec<Module> = layers
            .iter()
            .enumerate()
            .map(|(index, layer)| -> Result<_> {
                debug!("darknet layer {}: {:?}", index, layer);

                let init: ModuleInit = match *layer {
                    LayerDescriptor::ConvBn2D(ConvBlock {
                        in_c,
                        out_c,
                        k,
                        s,
                        p,
                        bias,
                    }) => ConvBn2DInit {
                        in_c,
                        out_c,
                        k,
                        s,
                        p,
                        bias,
                        activation,
                        batch_norm: Some(batch_norm),
                    }
                    .into(),
                    LayerDescriptor::MaxPool(MaxPool { k, s }) => {
                        MaxPool2DInit { k, s, p: 0 }.into()
                    }
                };

                init.build(path / index)
                    .with_context(|| format!("failed to build darknet layer {}", index))
            })
            .collect::<Result<_>>()?;

        Ok(Darknet {
            layers,
            modules,
            input_channels,
            output_channels,
        })
    }
}

#[derive(Debug)]
pub struct Darknet {
    layers: Vec<LayerDescriptor>,
    modules: Vec<Module>,
    input_channels: usize,
    output_channels: usize,
}

impl Darknet {
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }
}

impl nn::ModuleT for Darknet {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        self.modules
            .iter()
            .fold(xs.shallow_clone(), |xs, module| module.forward_t(&xs, train))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{kind::FLOAT_CPU, Device};
    use yolov1_config::{ArchItem, Architecture, ConvSpec};

    fn small_architecture() -> Architecture {
        Architecture::new([
            ConvSpec::new(3, 8, 2, 1).into(),
            ArchItem::MaxPool,
            ConvSpec::new(1, 4, 1, 0).into(),
            ConvSpec::new(3, 16, 1, 1).into(),
        ])
    }

    #[test]
    fn darknet_forward_shape() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let layers = small_architecture().interpret(3);
        let darknet = DarknetInit::new(3, layers).build(&vs.root() / "darknet")?;

        assert_eq!(darknet.modules().len(), 4);
        assert_eq!(darknet.output_channels(), 16);

        let input = Tensor::randn(&[2, 3, 32, 32], FLOAT_CPU);
        let output = darknet.forward_t(&input, true);
        assert_eq!(output.size(), [2, 16, 8, 8]);
        Ok(())
    }

    #[test]
    fn modules_follow_descriptors() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let layers = small_architecture().interpret(3);
        let darknet = DarknetInit::new(3, layers).build(&vs.root())?;

        let kinds: Vec<&str> = darknet.modules().iter().map(|module| module.as_ref()).collect();
        assert_eq!(kinds, ["ConvBn2D", "MaxPool2D", "ConvBn2D", "ConvBn2D"]);

        let weight_shape = darknet.modules()[2]
            .as_conv_bn_2d()
            .map(|block| block.conv().ws.size());
        assert_eq!(weight_shape, Some(vec![4, 8, 1, 1]));
        Ok(())
    }

    #[test]
    fn batch_norm_weights_start_at_one() -> Result<()> {
        let vs = nn::VarStore::new(Device::Cpu);
        let layers = small_architecture().interpret(3);
        DarknetInit::new(3, layers).build(&vs.root())?;

        let weights: Vec<_> = vs
            .variables()
            .into_iter()
            .filter(|(name, _)| name.ends_with("bn.weight"))
            .collect();
        assert_eq!(weights.len(), 3);
        weights.iter().for_each(|(name, weight)| {
            assert!(weight.equal(&weight.ones_like()), "{} is not all ones", name);
        });
        Ok(())
    }

    #[test]
    fn broken_wiring_fails_before_allocation() {
        let vs = nn::VarStore::new(Device::Cpu);
        let layers = vec![
            ConvSpec::new(3, 8, 1, 1).block(3).into(),
            ConvSpec::new(3, 16, 1, 1).block(4).into(),
        ];
        let result = DarknetInit::new(3, layers).build(&vs.root());

        assert!(result.is_err());
        assert!(vs.variables().is_empty());
    }
}
