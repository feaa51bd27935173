use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use prettytable::{cell, row, Table};
use std::path::{Path, PathBuf};
use tch::{kind::FLOAT_CPU, nn, Device, Tensor};
use yolov1::{
    config::{yolo_v1, HeadConfig, LayerDescriptor, ModelConfig},
    YoloV1Init,
};

#[derive(Debug, Clone, Parser)]
/// Inspect and test YOLOv1 model configurations.
enum Opts {
    /// Print the darknet layers and the head widths.
    Info {
        /// configuration file, the built-in VOC model if omitted
        #[clap(long)]
        config_file: Option<PathBuf>,
        /// input height
        #[clap(long, default_value = "448")]
        height: usize,
        /// input width
        #[clap(long, default_value = "448")]
        width: usize,
    },
    /// Print the resolved configuration in JSON.
    Dump {
        /// configuration file, the built-in VOC model if omitted
        #[clap(long)]
        config_file: Option<PathBuf>,
    },
    /// Build the model on CPU and run a random batch through it.
    SmokeTest {
        /// configuration file, the built-in VOC model if omitted
        #[clap(long)]
        config_file: Option<PathBuf>,
        #[clap(long, default_value = "2")]
        batch_size: usize,
        /// input height
        #[clap(long, default_value = "448")]
        height: usize,
        /// input width
        #[clap(long, default_value = "448")]
        width: usize,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info {
            config_file,
            height,
            width,
        } => {
            info(config_file.as_deref(), [height, width])?;
        }
        Opts::Dump { config_file } => {
            dump(config_file.as_deref())?;
        }
        Opts::SmokeTest {
            config_file,
            batch_size,
            height,
            width,
        } => {
            smoke_test(config_file.as_deref(), batch_size, [height, width])?;
        }
    }

    Ok(())
}

fn load_config(config_file: Option<&Path>) -> Result<ModelConfig> {
    let config = match config_file {
        Some(path) => ModelConfig::load(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => yolo_v1(HeadConfig::default()),
    };
    Ok(config)
}

fn info(config_file: Option<&Path>, input_size: [usize; 2]) -> Result<()> {
    let config = load_config(config_file)?;
    let layers = config.layers();
    let shapes = config.feature_shapes(input_size)?;

    // print layer information
    {
        let mut table = Table::new();
        table.add_row(row![
            "index",
            "kind",
            "in_c",
            "out_c",
            "kernel",
            "stride",
            "padding",
            "output shape"
        ]);

        let mut in_c = config.input_channels;
        layers
            .iter()
            .zip(&shapes)
            .enumerate()
            .for_each(|(index, (layer, shape))| {
                let (k, s, p) = match *layer {
                    LayerDescriptor::ConvBn2D(block) => (block.k, block.s, block.p),
                    LayerDescriptor::MaxPool(pool) => (pool.k, pool.s, 0),
                };
                table.add_row(row![
                    index,
                    layer.as_ref(),
                    in_c,
                    shape.c,
                    k,
                    s,
                    p,
                    shape
                ]);
                in_c = shape.c;
            });

        table.printstd();
    }

    // print head information
    {
        let head = &config.head;
        let mut table = Table::new();
        table.add_row(row!["split size", "boxes", "classes", "flatten width", "output width"]);
        table.add_row(row![
            head.split_size,
            head.num_boxes,
            head.num_classes,
            config.flatten_width(),
            head.output_width()
        ]);
        table.printstd();
    }

    if let Err(err) = config.check_input_size(input_size) {
        println!("warning: {:#}", err);
    }

    Ok(())
}

fn dump(config_file: Option<&Path>) -> Result<()> {
    let config = load_config(config_file)?;
    let text = serde_json::to_string_pretty(&config)?;
    println!("{}", text);
    Ok(())
}

fn smoke_test(config_file: Option<&Path>, batch_size: usize, input_size: [usize; 2]) -> Result<()> {
    let config = load_config(config_file)?;
    config.check_input_size(input_size)?;

    let [height, width] = input_size;
    let input_shape = [
        batch_size as i64,
        config.input_channels as i64,
        height as i64,
        width as i64,
    ];

    let vs = nn::VarStore::new(Device::Cpu);
    let model = YoloV1Init::from(config).build(&vs.root())?;
    info!("model has {} parameter tensors", vs.variables().len());

    let output = tch::no_grad(|| {
        let input = Tensor::randn(&input_shape, FLOAT_CPU);
        model.forward_t(&input, false)
    })?;
    println!("{:?}", output.size());

    Ok(())
}
