use crate::{
    arch::{ArchItem, Architecture, RepeatGroup},
    conv::ConvSpec,
    head::HeadConfig,
    model::ModelConfig,
};

/// The YOLOv1 darknet body. It reduces a 448×448 input to a 7×7×1024 feature map.
pub fn yolo_v1_architecture() -> Architecture {
    use ArchItem::MaxPool;

    let conv = |k, c, s, p| ArchItem::from(ConvSpec::new(k, c, s, p));
    let repeat = |first: [usize; 4], second: [usize; 4], repeats| {
        let [k1, c1, s1, p1] = first;
        let [k2, c2, s2, p2] = second;
        let group = RepeatGroup::new(
            ConvSpec::new(k1, c1, s1, p1),
            ConvSpec::new(k2, c2, s2, p2),
            repeats,
        );
        ArchItem::from(group)
    };

    Architecture::new([
        conv(7, 64, 2, 3),
        MaxPool,
        conv(3, 192, 1, 1),
        MaxPool,
        conv(1, 128, 1, 0),
        conv(3, 256, 1, 1),
        conv(1, 256, 1, 0),
        conv(3, 512, 1, 1),
        MaxPool,
        repeat([1, 256, 1, 0], [3, 512, 1, 1], 4),
        conv(1, 512, 1, 0),
        conv(3, 1024, 1, 1),
        MaxPool,
        repeat([1, 512, 1, 0], [3, 1024, 1, 1], 2),
        conv(3, 1024, 1, 1),
        conv(3, 1024, 2, 1),
        conv(3, 1024, 1, 1),
        conv(3, 1024, 1, 1),
    ])
}

/// YOLOv1 on RGB 448×448 images with the given head.
pub fn yolo_v1(head: HeadConfig) -> ModelConfig {
    ModelConfig {
        input_channels: 3,
        architecture: yolo_v1_architecture(),
        head,
    }
}
