use crate::common::*;

/// The shape of one convolution + batch norm + activation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawConvSpec", into = "RawConvSpec")]
pub struct ConvSpec {
    /// kernel size
    pub k: usize,
    /// number of filters, i.e. output channels
    pub c: usize,
    /// stride
    pub s: usize,
    /// zero padding on each side
    pub p: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct RawConvSpec {
    pub k: usize,
    pub c: usize,
    #[serde(default = "default_stride")]
    pub s: usize,
    pub p: Option<usize>,
}

impl From<RawConvSpec> for ConvSpec {
    fn from(raw: RawConvSpec) -> Self {
        let RawConvSpec { k, c, s, p } = raw;
        let p = p.unwrap_or(k / 2);
        Self { k, c, s, p }
    }
}

impl From<ConvSpec> for RawConvSpec {
    fn from(orig: ConvSpec) -> Self {
        let ConvSpec { k, c, s, p } = orig;
        Self { k, c, s, p: Some(p) }
    }
}

impl ConvSpec {
    pub const fn new(k: usize, c: usize, s: usize, p: usize) -> Self {
        Self { k, c, s, p }
    }

    pub fn validate(&self) -> Result<()> {
        let Self { k, c, s, .. } = *self;
        ensure!(k > 0, "kernel size must be positive");
        ensure!(c > 0, "number of filters must be positive");
        ensure!(s > 0, "stride must be positive");
        Ok(())
    }

    /// Instantiate the block for the given number of input channels.
    pub fn block(&self, in_c: usize) -> ConvBlock {
        let Self { k, c, s, p } = *self;
        ConvBlock {
            in_c,
            out_c: c,
            k,
            s,
            p,
            bias: false,
        }
    }
}

/// A convolution block with resolved input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConvBlock {
    pub in_c: usize,
    pub out_c: usize,
    pub k: usize,
    pub s: usize,
    pub p: usize,
    pub bias: bool,
}

impl ConvBlock {
    /// Output height and width, or `None` if the kernel does not fit.
    pub fn output_size(&self, [in_h, in_w]: [usize; 2]) -> Option<[usize; 2]> {
        let Self { k, s, p, .. } = *self;
        let out = |len: usize| Some((len + 2 * p).checked_sub(k)? / s + 1);
        Some([out(in_h)?, out(in_w)?])
    }
}

fn default_stride() -> usize {
    1
}
