//! Clinical threshold bands for the vitals recorded in a journal entry.
//!
//! Every metric is classified on its own and only when its readings are
//! present. Bands are checked top to bottom; the first match wins.

use std::collections::BTreeMap;

use serde::Serialize;

use super::dto::Vitals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    BloodPressure,
    BloodSugar,
    HeartRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub abnormal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub message: &'static str,
}

impl Assessment {
    fn normal(message: &'static str) -> Self {
        Self {
            abnormal: false,
            severity: None,
            message,
        }
    }

    fn abnormal(message: &'static str) -> Self {
        Self {
            abnormal: true,
            severity: None,
            message,
        }
    }

    fn severe(message: &'static str) -> Self {
        Self {
            abnormal: true,
            severity: Some(Severity::Severe),
            message,
        }
    }
}

pub fn blood_pressure(systolic: f64, diastolic: f64) -> Assessment {
    if systolic >= 160.0 || diastolic >= 110.0 {
        Assessment::severe("Severe hypertension, seek medical care promptly")
    } else if systolic >= 140.0 || diastolic >= 90.0 {
        Assessment::abnormal("Elevated blood pressure (140/90 or higher)")
    } else if systolic < 90.0 || diastolic < 60.0 {
        Assessment::abnormal("Low blood pressure (hypotension)")
    } else {
        Assessment::normal("Blood pressure within normal range")
    }
}

pub fn blood_sugar(mg_dl: f64) -> Assessment {
    if mg_dl > 95.0 {
        Assessment::abnormal("Blood sugar above target (over 95 mg/dL)")
    } else if mg_dl < 70.0 {
        Assessment::abnormal("Low blood sugar (hypoglycemia)")
    } else {
        Assessment::normal("Blood sugar within target range")
    }
}

pub fn heart_rate(bpm: f64) -> Assessment {
    if bpm > 120.0 {
        Assessment::abnormal("Elevated heart rate (over 120 bpm)")
    } else if bpm < 50.0 {
        Assessment::abnormal("Low heart rate (bradycardia)")
    } else {
        Assessment::normal("Heart rate within normal range")
    }
}

pub fn classify(vitals: &Vitals) -> BTreeMap<Metric, Assessment> {
    let mut out = BTreeMap::new();
    if let (Some(sys), Some(dia)) = (vitals.systolic_bp, vitals.diastolic_bp) {
        out.insert(Metric::BloodPressure, blood_pressure(sys, dia));
    }
    if let Some(sugar) = vitals.blood_sugar_level_mg_dl {
        out.insert(Metric::BloodSugar, blood_sugar(sugar));
    }
    if let Some(bpm) = vitals.heart_rate_bpm {
        out.insert(Metric::HeartRate, heart_rate(bpm));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals(sys: Option<f64>, dia: Option<f64>, bpm: Option<f64>, sugar: Option<f64>) -> Vitals {
        Vitals {
            systolic_bp: sys,
            diastolic_bp: dia,
            heart_rate_bpm: bpm,
            blood_sugar_level_mg_dl: sugar,
            ..Default::default()
        }
    }

    #[test]
    fn severe_when_either_pressure_crosses_its_limit() {
        for (sys, dia) in [(160.0, 70.0), (200.0, 50.0), (120.0, 110.0), (85.0, 130.0)] {
            let a = blood_pressure(sys, dia);
            assert_eq!(a.severity, Some(Severity::Severe), "{sys}/{dia}");
            assert!(a.abnormal);
        }
        let result = classify(&vitals(Some(165.0), Some(80.0), Some(80.0), Some(85.0)));
        assert_eq!(
            result[&Metric::BloodPressure].severity,
            Some(Severity::Severe)
        );
        assert!(!result[&Metric::HeartRate].abnormal);
    }

    #[test]
    fn pressure_bands_in_order() {
        let elevated = blood_pressure(140.0, 80.0);
        assert!(elevated.abnormal);
        assert_eq!(elevated.severity, None);
        assert!(blood_pressure(120.0, 90.0).abnormal);
        assert!(blood_pressure(159.9, 109.9).severity.is_none());

        // hypotension only once the hypertensive bands miss
        assert!(blood_pressure(89.0, 70.0).abnormal);
        assert!(blood_pressure(100.0, 59.0).abnormal);
        assert_eq!(
            blood_pressure(85.0, 95.0).message,
            blood_pressure(140.0, 60.0).message
        );

        let normal = blood_pressure(90.0, 60.0);
        assert!(!normal.abnormal);
        assert!(!blood_pressure(139.0, 89.0).abnormal);
    }

    #[test]
    fn blood_sugar_boundaries() {
        assert!(!blood_sugar(95.0).abnormal);
        assert!(blood_sugar(95.01).abnormal);
        assert!(!blood_sugar(70.0).abnormal);
        assert!(blood_sugar(69.99).abnormal);
        assert!(!blood_sugar(82.5).abnormal);
    }

    #[test]
    fn heart_rate_boundaries_are_strict() {
        assert!(!heart_rate(50.0).abnormal);
        assert!(!heart_rate(120.0).abnormal);
        assert!(heart_rate(49.0).abnormal);
        assert!(heart_rate(121.0).abnormal);
        assert_eq!(heart_rate(121.0).severity, None);
    }

    #[test]
    fn absent_readings_produce_no_entry() {
        assert!(classify(&Vitals::default()).is_empty());

        let only_sugar = classify(&vitals(None, None, None, Some(60.0)));
        assert_eq!(only_sugar.len(), 1);
        assert!(only_sugar[&Metric::BloodSugar].abnormal);

        // one pressure reading alone is not enough
        let half_pressure = classify(&vitals(Some(180.0), None, None, None));
        assert!(half_pressure.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_metric_keys() {
        let result = classify(&vitals(Some(170.0), Some(100.0), Some(45.0), None));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["bloodPressure"]["severity"], "severe");
        assert_eq!(json["heartRate"]["abnormal"], true);
        assert!(json["heartRate"].get("severity").is_none());
        assert!(json.get("bloodSugar").is_none());
    }
}
