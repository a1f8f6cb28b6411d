use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::vitals::{Assessment, Metric};

/// Readings captured with a journal entry. All optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    #[serde(rename = "systolicBP", default)]
    pub systolic_bp: Option<f64>,
    #[serde(rename = "diastolicBP", default)]
    pub diastolic_bp: Option<f64>,
    #[serde(rename = "heartRateBPM", default)]
    pub heart_rate_bpm: Option<f64>,
    #[serde(rename = "bloodSugarLevelMgDl", default)]
    pub blood_sugar_level_mg_dl: Option<f64>,
    #[serde(rename = "currentWeight", default)]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub mood: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Symptom {
    Name(String),
    Record {
        #[serde(alias = "symptomName")]
        name: String,
    },
}

impl Symptom {
    pub fn name(&self) -> &str {
        match self {
            Symptom::Name(name) | Symptom::Record { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JournalImage {
    Url(String),
    Record {
        #[serde(alias = "imageUrl")]
        url: String,
    },
}

impl JournalImage {
    pub fn url(&self) -> &str {
        match self {
            JournalImage::Url(url) | JournalImage::Record { url } => url,
        }
    }
}

/// Read-only journal entry as the upstream returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(default)]
    pub current_week: Option<u32>,
    #[serde(default)]
    pub current_trimester: Option<u8>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub images: Vec<JournalImage>,
    #[serde(flatten)]
    pub vitals: Vitals,
}

#[derive(Debug, Serialize)]
pub struct JournalDetail {
    pub entry: JournalEntry,
    pub symptoms: Vec<String>,
    pub images: Vec<String>,
    pub assessments: BTreeMap<Metric, Assessment>,
}
