use image::{Rgb, RgbImage};
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use mot2coco::coco::CocoFile;
use mot2coco::{
    clip_to_region, convert_dataset, convert_split, plan_split, region_origin_points, ConvertConfig, Error, Mode,
    PixelBox, Size, Taxonomy,
};

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

const GAMEINFO: &str = "[Sequence]\nnum_tracklets=2\ntrackletID_1= player team left;10\ntrackletID_2= ball;1\n";

// frame 3 has ground truth but no image
const GT: &str = "1,1,2,2,10,10,1,-1,-1,-1\n1,2,28,10,8,8,1,-1,-1,-1\n2,1,40,30,5,5,1,-1,-1,-1\n3,1,0,0,4,4,1,-1,-1,-1\n";

fn write_sequence(split_dir: &Path, name: &str, gt: &str, frames: &[(u32, u32, u32)]) -> PathBuf {
    let seq_dir = split_dir.join(name);
    fs::create_dir_all(seq_dir.join("gt")).unwrap();
    fs::create_dir_all(seq_dir.join("img1")).unwrap();

    let seqinfo = format!(
        "[Sequence]\nname={}\nimDir=img1\nframeRate=25\nseqLength={}\nimWidth={}\nimHeight={}\nimExt=.jpg\n",
        name,
        frames.len(),
        FRAME_WIDTH,
        FRAME_HEIGHT
    );
    fs::write(seq_dir.join("seqinfo.ini"), seqinfo).unwrap();
    fs::write(seq_dir.join("gameinfo.ini"), GAMEINFO).unwrap();
    fs::write(seq_dir.join("gt").join("gt.txt"), gt).unwrap();

    for &(number, width, height) in frames {
        let frame = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, number as u8]));
        frame.save(seq_dir.join("img1").join(format!("{:06}.jpg", number))).unwrap();
    }
    seq_dir
}

fn tiled_config(data_dir: &Path, output_dir: &Path, stride: u64) -> ConvertConfig {
    ConvertConfig {
        data_dir: data_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        splits: vec!["train".to_string()],
        stride,
        crop_size: Size::new(32, 32),
        rows: 2,
        cols: 2,
        ..ConvertConfig::default()
    }
}

fn full_frames() -> Vec<(u32, u32, u32)> {
    vec![(1, FRAME_WIDTH, FRAME_HEIGHT), (2, FRAME_WIDTH, FRAME_HEIGHT)]
}

fn read_coco(path: &Path) -> CocoFile {
    serde_json::from_reader(File::open(path).unwrap()).unwrap()
}

#[test]
fn test_tiled_plan_clips_boxes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let split_dir = temp_dir.path().join("train");
    write_sequence(&split_dir, "SNMOT-001", GT, &full_frames());

    let config = tiled_config(temp_dir.path(), temp_dir.path(), 1);
    let plan = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap();

    let ids: Vec<u64> = plan.coco.images.iter().map(|i| i.id).collect();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    assert!(plan.coco.images.iter().all(|i| (i.width, i.height) == (32, 32)));

    let boxes: Vec<(u64, u32, [i64; 4])> = plan
        .coco
        .annotations
        .iter()
        .map(|a| (a.image_id, a.category_id, a.bbox))
        .collect();
    assert_eq!(
        boxes,
        vec![
            (1, 1, [2, 2, 10, 10]),
            (1, 5, [28, 10, 4, 8]),
            (2, 5, [28, 0, 4, 2]),
            (3, 5, [0, 10, 4, 8]),
            (4, 5, [0, 0, 4, 2]),
            (7, 1, [8, 30, 5, 2]),
            (8, 1, [8, 14, 5, 5]),
        ]
    );

    let ann_ids: Vec<u64> = plan.coco.annotations.iter().map(|a| a.id).collect();
    assert_eq!(ann_ids, (1..=7).collect::<Vec<_>>());
    assert!(plan.coco.annotations.iter().all(|a| a.area == a.bbox[2] * a.bbox[3]));

    assert_eq!(plan.stats.sequences, 1);
    assert_eq!(plan.stats.frames, 2);
    assert_eq!(plan.stats.samples_generated, 8);
    assert_eq!(plan.stats.boxes_outside, 5);
    assert_eq!(plan.jobs.len(), 2);
    assert_eq!(plan.jobs[0].outputs.len(), 4);
}

#[test]
fn test_stride_keeps_every_nth_sample() {
    let temp_dir = tempfile::tempdir().unwrap();
    let split_dir = temp_dir.path().join("train");
    write_sequence(&split_dir, "SNMOT-001", GT, &full_frames());

    let config = tiled_config(temp_dir.path(), temp_dir.path(), 2);
    let plan = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap();

    let ids: Vec<u64> = plan.coco.images.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![2, 4, 6, 8]);
    assert_eq!(plan.stats.samples_generated, 8);

    let image_ids: Vec<u64> = plan.coco.annotations.iter().map(|a| a.image_id).collect();
    assert_eq!(image_ids, vec![2, 4, 8]);
}

#[test]
fn test_annotation_count_matches_surviving_boxes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let split_dir = temp_dir.path().join("train");
    write_sequence(&split_dir, "SNMOT-001", GT, &full_frames());

    let config = tiled_config(temp_dir.path(), temp_dir.path(), 1);
    let plan = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap();

    let regions = region_origin_points(Size::new(FRAME_WIDTH, FRAME_HEIGHT), Size::new(32, 32), 2, 2).unwrap();
    let frame_boxes = [
        vec![PixelBox::new(2, 2, 10, 10), PixelBox::new(28, 10, 8, 8)],
        vec![PixelBox::new(40, 30, 5, 5)],
    ];
    let expected: usize = frame_boxes
        .iter()
        .flat_map(|boxes| {
            regions
                .iter()
                .map(move |region| boxes.iter().filter(|b| clip_to_region(b, region).is_some()).count())
        })
        .sum();

    assert_eq!(plan.coco.annotations.len(), expected);

    let image_ids: HashSet<u64> = plan.coco.images.iter().map(|i| i.id).collect();
    assert!(plan.coco.annotations.iter().all(|a| image_ids.contains(&a.image_id)));
}

#[test]
fn test_sequences_are_visited_in_name_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    let split_dir = temp_dir.path().join("train");
    write_sequence(&split_dir, "SNMOT-b", GT, &full_frames());
    write_sequence(&split_dir, "SNMOT-a", GT, &[(1, FRAME_WIDTH, FRAME_HEIGHT)]);

    let config = ConvertConfig {
        mode: Mode::Whole,
        stride: 1,
        ..tiled_config(temp_dir.path(), temp_dir.path(), 1)
    };
    let plan = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap();

    assert_eq!(plan.coco.images.len(), 3);
    assert!(plan.jobs[0].source.starts_with(split_dir.join("SNMOT-a")));
    assert!(plan.jobs[1].source.starts_with(split_dir.join("SNMOT-b")));
    assert!(plan.jobs[2].source.ends_with("000002.jpg"));
}

#[test]
fn test_convert_tiled_split_writes_images_and_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path().join("tracking");
    let output_dir = temp_dir.path().join("soccer");
    write_sequence(&data_dir.join("train"), "SNMOT-001", GT, &full_frames());

    let config = tiled_config(&data_dir, &output_dir, 2);
    let summary = convert_split(&config, "train").unwrap();

    assert_eq!(summary.json_path, output_dir.join("annotations").join("instances_train.json"));
    assert_eq!(summary.stats.images_written, 4);
    assert_eq!(summary.stats.annotations, 3);

    let coco = read_coco(&summary.json_path);
    assert_eq!(coco.categories.len(), 5);
    assert_eq!(coco.images.len(), 4);
    assert_eq!(coco.annotations.len(), 3);

    for image in &coco.images {
        let path = output_dir.join("train").join(&image.file_name);
        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (32, 32));
    }
    assert!(output_dir.join("train").join("000000000002.jpg").exists());
    assert!(!output_dir.join("train").join("000000000001.jpg").exists());
    assert_eq!(fs::read_dir(output_dir.join("train")).unwrap().count(), 4);
}

#[test]
fn test_convert_whole_frames_keeps_boxes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path().join("tracking");
    let output_dir = temp_dir.path().join("soccer");
    let seq_dir = write_sequence(&data_dir.join("train"), "SNMOT-001", GT, &full_frames());

    let config = ConvertConfig {
        mode: Mode::Whole,
        taxonomy: Taxonomy::Binary,
        ..tiled_config(&data_dir, &output_dir, 1)
    };
    let summary = convert_split(&config, "train").unwrap();
    let coco = read_coco(&summary.json_path);

    assert_eq!(coco.images.len(), 2);
    assert!(coco.images.iter().all(|i| (i.width, i.height) == (FRAME_WIDTH, FRAME_HEIGHT)));
    assert_eq!(coco.categories.len(), 2);

    let boxes: Vec<(u64, u32, [i64; 4])> = coco
        .annotations
        .iter()
        .map(|a| (a.image_id, a.category_id, a.bbox))
        .collect();
    assert_eq!(
        boxes,
        vec![(1, 1, [2, 2, 10, 10]), (1, 2, [28, 10, 8, 8]), (2, 1, [40, 30, 5, 5])]
    );

    // jpeg frames are copied verbatim
    let source = fs::read(seq_dir.join("img1").join("000001.jpg")).unwrap();
    let copied = fs::read(output_dir.join("train").join("000000000001.jpg")).unwrap();
    assert_eq!(source, copied);
}

#[test]
fn test_convert_dataset_handles_every_split() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path().join("tracking");
    let output_dir = temp_dir.path().join("soccer");
    write_sequence(&data_dir.join("train"), "SNMOT-001", GT, &full_frames());
    write_sequence(&data_dir.join("test"), "SNMOT-101", GT, &full_frames());

    let config = ConvertConfig {
        splits: vec!["train".to_string(), "test".to_string()],
        ..tiled_config(&data_dir, &output_dir, 5)
    };
    let summaries = convert_dataset(&config).unwrap();

    assert_eq!(summaries.len(), 2);
    for split in ["train", "test"] {
        let coco = read_coco(&output_dir.join("annotations").join(format!("instances_{}.json", split)));
        // 8 samples per split, stride 5 keeps the 5th
        let ids: Vec<u64> = coco.images.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![5]);
    }
}

#[test]
fn test_unknown_track_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let split_dir = temp_dir.path().join("train");
    write_sequence(&split_dir, "SNMOT-001", "1,9,2,2,10,10,1,-1,-1,-1\n", &full_frames());

    let config = tiled_config(temp_dir.path(), temp_dir.path(), 1);
    let err = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap_err();
    assert!(matches!(err, Error::UnknownTrack { track: 9, .. }));
}

#[test]
fn test_unknown_track_outside_every_crop_is_skipped() {
    let temp_dir = tempfile::tempdir().unwrap();
    let split_dir = temp_dir.path().join("train");
    let gt = "1,1,2,2,10,10,1,-1,-1,-1\n1,9,500,500,10,10,1,-1,-1,-1\n";
    write_sequence(&split_dir, "SNMOT-001", gt, &full_frames());

    let config = tiled_config(temp_dir.path(), temp_dir.path(), 1);
    let plan = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap();

    assert_eq!(plan.coco.annotations.len(), 1);
    assert_eq!(plan.stats.boxes_outside, 7);
}

#[test]
fn test_degenerate_boxes_kept_unless_dropped() {
    let temp_dir = tempfile::tempdir().unwrap();
    let split_dir = temp_dir.path().join("train");
    // right edge touches the second column of crops
    write_sequence(&split_dir, "SNMOT-001", "1,1,20,2,12,10,1,-1,-1,-1\n", &full_frames());

    let config = tiled_config(temp_dir.path(), temp_dir.path(), 1);
    let plan = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap();
    let boxes: Vec<(u64, [i64; 4], i64)> = plan
        .coco
        .annotations
        .iter()
        .map(|a| (a.image_id, a.bbox, a.area))
        .collect();
    assert_eq!(boxes, vec![(1, [20, 2, 12, 10], 120), (3, [0, 2, 0, 10], 0)]);
    assert_eq!(plan.stats.boxes_degenerate, 0);

    let config = ConvertConfig {
        drop_degenerate: true,
        ..config
    };
    let plan = plan_split(&config, &split_dir, &temp_dir.path().join("out")).unwrap();
    let boxes: Vec<[i64; 4]> = plan.coco.annotations.iter().map(|a| a.bbox).collect();
    assert_eq!(boxes, vec![[20, 2, 12, 10]]);
    assert_eq!(plan.stats.boxes_degenerate, 1);
    assert_eq!(plan.stats.annotations, 1);
    assert_eq!(plan.stats.boxes_outside, 2);
}

#[test]
fn test_frame_size_mismatch_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path().join("tracking");
    write_sequence(&data_dir.join("train"), "SNMOT-001", GT, &[(1, 60, FRAME_HEIGHT)]);

    let config = tiled_config(&data_dir, &temp_dir.path().join("soccer"), 1);
    let err = convert_split(&config, "train").unwrap_err();
    assert!(matches!(
        err,
        Error::FrameSize {
            expected: (64, 48),
            actual: (60, 48),
            ..
        }
    ));
}

#[test]
fn test_whole_frame_size_mismatch_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path().join("tracking");
    let output_dir = temp_dir.path().join("soccer");
    write_sequence(&data_dir.join("train"), "SNMOT-001", GT, &[(1, 60, FRAME_HEIGHT)]);

    let config = ConvertConfig {
        mode: Mode::Whole,
        ..tiled_config(&data_dir, &output_dir, 1)
    };
    let err = convert_split(&config, "train").unwrap_err();
    assert!(matches!(
        err,
        Error::FrameSize {
            expected: (64, 48),
            actual: (60, 48),
            ..
        }
    ));
    assert!(!output_dir.join("train").join("000000000001.jpg").exists());
    assert!(!output_dir.join("annotations").join("instances_train.json").exists());
}
