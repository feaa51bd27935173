use crate::{
    common::*,
    conv::{ConvBlock, ConvSpec},
    descriptor::{LayerDescriptor, MaxPool},
};

/// One entry of the darknet body description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ArchItem {
    Conv(ConvSpec),
    MaxPool,
    Repeat(RepeatGroup),
}

impl From<ConvSpec> for ArchItem {
    fn from(v: ConvSpec) -> Self {
        Self::Conv(v)
    }
}

impl From<RepeatGroup> for ArchItem {
    fn from(v: RepeatGroup) -> Self {
        Self::Repeat(v)
    }
}

impl ArchItem {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Conv(spec) => spec.validate(),
            Self::MaxPool => Ok(()),
            Self::Repeat(group) => group.validate(),
        }
    }
}

/// A pair of convolutions repeated `repeats` times.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepeatGroup {
    pub first: ConvSpec,
    pub second: ConvSpec,
    pub repeats: usize,
}

impl RepeatGroup {
    pub fn new(first: ConvSpec, second: ConvSpec, repeats: usize) -> Self {
        Self {
            first,
            second,
            repeats,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.first.validate().context("invalid first convolution")?;
        self.second
            .validate()
            .context("invalid second convolution")?;
        ensure!(self.repeats > 0, "number of repeats must be positive");
        Ok(())
    }

    /// Expand the group into `2 * repeats` blocks, starting from `in_c` input channels.
    pub fn blocks(&self, in_c: usize) -> impl Iterator<Item = ConvBlock> + '_ {
        iter::repeat([&self.first, &self.second])
            .take(self.repeats)
            .flatten()
            .scan(in_c, |in_c, spec| {
                let block = spec.block(*in_c);
                *in_c = spec.c;
                Some(block)
            })
    }
}

/// The ordered darknet body description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Architecture(Vec<ArchItem>);

impl Architecture {
    pub fn new(items: impl IntoIterator<Item = ArchItem>) -> Self {
        Self(items.into_iter().collect())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.0.is_empty(), "architecture must not be empty");
        self.0
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| {
                item.validate()
                    .with_context(|| format!("invalid {} entry at index {}", item.as_ref(), index))
            })
    }

    /// Expand the architecture into layer descriptors.
    ///
    /// The channel count starts at `input_channels` and is replaced by the
    /// filter count of every emitted convolution block. Pooling layers keep it
    /// unchanged.
    pub fn interpret(&self, input_channels: usize) -> Vec<LayerDescriptor> {
        let (layers, _out_c) = self.0.iter().fold(
            (vec![], input_channels),
            |(mut layers, in_c), item| {
                let out_c = match item {
                    ArchItem::Conv(spec) => {
                        layers.push(spec.block(in_c).into());
                        spec.c
                    }
                    ArchItem::MaxPool => {
                        layers.push(MaxPool::default().into());
                        in_c
                    }
                    ArchItem::Repeat(group) => {
                        group.blocks(in_c).fold(in_c, |_, block| {
                            layers.push(block.into());
                            block.out_c
                        })
                    }
                };
                (layers, out_c)
            },
        );
        layers
    }

    /// The number of channels of the final feature map.
    pub fn output_channels(&self, input_channels: usize) -> usize {
        self.0.iter().fold(input_channels, |in_c, item| match item {
            ArchItem::Conv(spec) => spec.c,
            ArchItem::MaxPool => in_c,
            ArchItem::Repeat(group) => group
                .blocks(in_c)
                .last()
                .map(|block| block.out_c)
                .unwrap_or(in_c),
        })
    }
}

impl Deref for Architecture {
    type Target = [ArchItem];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl FromIterator<ArchItem> for Architecture {
    fn from_iter<T: IntoIterator<Item = ArchItem>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Expand an architecture into layer descriptors. See [Architecture::interpret].
pub fn interpret(architecture: &Architecture, input_channels: usize) -> Vec<LayerDescriptor> {
    architecture.interpret(input_channels)
}
