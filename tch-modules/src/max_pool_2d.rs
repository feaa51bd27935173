use crate::common::*;

#[derive(Debug, Clone)]
pub struct MaxPool2DInit {
    pub k: usize,
    pub s: usize,
    pub p: usize,
}

impl Default for MaxPool2DInit {
    /// The 2×2 stride-2 downsampling used between darknet stages.
    fn default() -> Self {
        Self { k: 2, s: 2, p: 0 }
    }
}

impl MaxPool2DInit {
    pub fn build(self) -> Result<MaxPool2D> {
        let Self { k, s, p } = self;
        ensure!(k > 0, "kernel size must be positive");
        ensure!(s > 0, "stride must be positive");
        ensure!(p <= k / 2, "padding must not exceed half of the kernel size");

        Ok(MaxPool2D {
            k: k as i64,
            s: s as i64,
            p: p as i64,
        })
    }
}

#[derive(Debug)]
pub struct MaxPool2D {
    k: i64,
    s: i64,
    p: i64,
}

impl nn::Module for MaxPool2D {
    fn forward(&self, xs: &Tensor) -> Tensor {
        let Self { k, s, p } = *self;
        xs.max_pool2d(
            &[k, k],
            &[s, s],
            &[p, p],
            &[1, 1], // dilation
            false,   // ceil_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::kind::FLOAT_CPU;

    #[test]
    fn max_pool_2d_halves_size() -> Result<()> {
        let pool = MaxPool2DInit::default().build()?;
        let input = Tensor::randn(&[2, 8, 14, 15], FLOAT_CPU);
        let output = pool.forward(&input);
        assert_eq!(output.size(), [2, 8, 7, 7]);
        Ok(())
    }

    #[test]
    fn max_pool_2d_takes_window_maximum() -> Result<()> {
        let pool = MaxPool2DInit::default().build()?;
        let input = Tensor::of_slice(&[1.0f32, 5.0, 2.0, 0.0, -1.0, 3.0, 4.0, 7.0]).view([1, 1, 2, 4]);
        let output = pool.forward(&input);
        let expect = Tensor::of_slice(&[5.0f32, 7.0]).view([1, 1, 1, 2]);
        assert!(output.equal(&expect));
        Ok(())
    }

    #[test]
    fn reject_excessive_padding() {
        let init = MaxPool2DInit { k: 2, s: 2, p: 2 };
        assert!(init.build().is_err());
    }
}
