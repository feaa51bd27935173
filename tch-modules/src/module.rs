use crate::{
    common::*,
    conv_bn_2d::{ConvBn2D, ConvBn2DInit},
    max_pool_2d::{MaxPool2D, MaxPool2DInit},
};

/// A layer of a sequential feature extractor.
#[derive(Debug, AsRefStr)]
pub enum Module {
    ConvBn2D(ConvBn2D),
    MaxPool2D(MaxPool2D),
}

impl From<ConvBn2D> for Module {
    fn from(v: ConvBn2D) -> Self {
        Self::ConvBn2D(v)
    }
}

impl From<MaxPool2D> for Module {
    fn from(v: MaxPool2D) -> Self {
        Self::MaxPool2D(v)
    }
}

impl Module {
    pub fn as_conv_bn_2d(&self) -> Option<&ConvBn2D> {
        match self {
            Self::ConvBn2D(module) => Some(module),
            _ => None,
        }
    }
}

impl nn::ModuleT for Module {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        match self {
            Self::ConvBn2D(module) => module.forward_t(xs, train),
            Self::MaxPool2D(module) => module.forward(xs),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ModuleInit {
    ConvBn2D(ConvBn2DInit),
    MaxPool2D(MaxPool2DInit),
}

impl From<ConvBn2DInit> for ModuleInit {
    fn from(v: ConvBn2DInit) -> Self {
        Self::ConvBn2D(v)
    }
}

impl From<MaxPool2DInit> for ModuleInit {
    fn from(v: MaxPool2DInit) -> Self {
        Self::MaxPool2D(v)
    }
}

impl ModuleInit {
    pub fn build<'p, P>(self, path: P) -> Result<Module>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let module: Module = match self {
            Self::ConvBn2D(init) => init.build(path)?.into(),
            Self::MaxPool2D(init) => init.build()?.into(),
        };
        Ok(module)
    }
}
