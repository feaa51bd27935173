use crate::{
    arch::Architecture,
    common::*,
    descriptor::{check_final_size, check_wiring, feature_shapes, FeatureShape, LayerDescriptor},
    head::HeadConfig,
};

/// The complete YOLOv1 model configuration.
///
/// Deserialization validates the configuration, so a loaded `ModelConfig`
/// always describes a buildable model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ModelConfigUnchecked", into = "ModelConfigUnchecked")]
pub struct ModelConfig {
    pub input_channels: usize,
    pub architecture: Architecture,
    pub head: HeadConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct ModelConfigUnchecked {
    #[serde(default = "default_input_channels")]
    pub input_channels: usize,
    pub architecture: Architecture,
    #[serde(default)]
    pub head: HeadConfig,
}

impl TryFrom<ModelConfigUnchecked> for ModelConfig {
    type Error = Error;

    fn try_from(from: ModelConfigUnchecked) -> Result<Self, Self::Error> {
        let ModelConfigUnchecked {
            input_channels,
            architecture,
            head,
        } = from;

        let config = Self {
            input_channels,
            architecture,
            head,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<ModelConfig> for ModelConfigUnchecked {
    fn from(from: ModelConfig) -> Self {
        let ModelConfig {
            input_channels,
            architecture,
            head,
        } = from;

        Self {
            input_channels,
            architecture,
            head,
        }
    }
}

impl ModelConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let config = json5::from_str(&text)
            .with_context(|| format!("failed to parse '{}'", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.input_channels > 0, "input_channels must be positive");
        self.architecture.validate()?;
        self.head.validate()?;
        Ok(())
    }

    /// The darknet body layers with channels threaded from `input_channels`.
    pub fn layers(&self) -> Vec<LayerDescriptor> {
        self.architecture.interpret(self.input_channels)
    }

    /// Channels of the final feature map, which is flattened into the head.
    pub fn output_channels(&self) -> usize {
        self.architecture.output_channels(self.input_channels)
    }

    /// Input width of the first fully-connected layer.
    pub fn flatten_width(&self) -> usize {
        self.head.flatten_width(self.output_channels())
    }

    pub fn feature_shapes(&self, input_size: [usize; 2]) -> Result<Vec<FeatureShape>> {
        let layers = self.layers();
        check_wiring(&layers, self.input_channels)?;
        feature_shapes(&layers, self.input_channels, input_size)
    }

    /// Check that an input of the given size yields an `S × S` final feature map.
    pub fn check_input_size(&self, input_size: [usize; 2]) -> Result<()> {
        let layers = self.layers();
        check_wiring(&layers, self.input_channels)?;
        check_final_size(&layers, input_size, self.head.split_size)
    }
}

fn default_input_channels() -> usize {
    3
}
