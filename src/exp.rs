//! YOLOX experiment presets for the soccer datasets.
//!
//! An experiment is a flat record of attributes read by the YOLOX trainer.
//! Unset attributes keep the YOLOX base defaults.

use serde::{Deserialize, Serialize};

use crate::categories::Taxonomy;
use crate::error::{Error, Result};

pub const PRESET_NAMES: [&str; 3] = ["yolox_s_fhd_bi", "yolox_m_fhd", "yolox_x_fhd"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experiment {
    pub exp_name: String,
    pub depth: f64,
    pub width: f64,
    pub num_classes: usize,
    pub max_epoch: u32,
    /// (height, width)
    pub input_size: (u32, u32),
    /// (height, width)
    pub test_size: (u32, u32),
    pub data_dir: Option<String>,
    pub train_ann: String,
    pub val_ann: String,
    pub test_ann: String,
    pub train_dataset_name: String,
    pub val_dataset_name: String,
    pub test_dataset_name: String,
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            exp_name: "yolox".to_string(),
            depth: 1.0,
            width: 1.0,
            num_classes: 80,
            max_epoch: 300,
            input_size: (640, 640),
            test_size: (640, 640),
            data_dir: None,
            train_ann: "instances_train2017.json".to_string(),
            val_ann: "instances_val2017.json".to_string(),
            test_ann: "instances_test2017.json".to_string(),
            train_dataset_name: "train2017".to_string(),
            val_dataset_name: "val2017".to_string(),
            test_dataset_name: "test2017".to_string(),
        }
    }
}

impl Experiment {
    /// Look up a preset by name
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "yolox_s_fhd_bi" => Ok(Self {
                max_epoch: 50,
                ..Self::soccer(name, 0.33, 0.50, "datasets/soccer-bi", Taxonomy::Binary)
            }),
            "yolox_m_fhd" => Ok(Self::soccer(name, 0.67, 0.75, "datasets/soccer", Taxonomy::Full)),
            "yolox_x_fhd" => Ok(Self::soccer(name, 1.33, 1.25, "datasets/soccer", Taxonomy::Full)),
            _ => Err(Error::UnknownExperiment(name.to_string())),
        }
    }

    pub fn presets() -> Vec<Self> {
        PRESET_NAMES
            .iter()
            .filter_map(|name| Self::preset(name).ok())
            .collect()
    }

    // Shared layout of the converter's output: train split for training, test for val and test
    fn soccer(name: &str, depth: f64, width: f64, data_dir: &str, taxonomy: Taxonomy) -> Self {
        Self {
            exp_name: name.to_string(),
            depth,
            width,
            num_classes: taxonomy.num_classes(),
            data_dir: Some(data_dir.to_string()),
            train_ann: "instances_train.json".to_string(),
            val_ann: "instances_test.json".to_string(),
            test_ann: "instances_test.json".to_string(),
            train_dataset_name: "train".to_string(),
            val_dataset_name: "test".to_string(),
            test_dataset_name: "test".to_string(),
            ..Self::default()
        }
    }

    /// The converter taxonomy producing a dataset with this class count
    pub fn taxonomy(&self) -> Option<Taxonomy> {
        [Taxonomy::Full, Taxonomy::Binary]
            .into_iter()
            .find(|taxonomy| taxonomy.num_classes() == self.num_classes)
    }
}
