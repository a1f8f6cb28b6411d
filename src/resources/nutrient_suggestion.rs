use serde::{Deserialize, Serialize};

use super::{require_text, ReferenceData, ReferenceKind, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientSuggestion {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<NutrientSuggestionAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientSuggestionInput {
    #[serde(default)]
    pub name: String,
}

impl Resource for NutrientSuggestion {
    type Id = i64;
    type Input = NutrientSuggestionInput;

    const NAME: &'static str = "Nutrient suggestion";
    const SLUG: &'static str = "nutrient-suggestions";
    const COLLECTION: &'static str = "/api/nutrient-suggestion";

    fn label(&self, _refs: &ReferenceData) -> String {
        self.name.clone()
    }

    fn to_input(&self) -> NutrientSuggestionInput {
        NutrientSuggestionInput {
            name: self.name.clone(),
        }
    }

    fn validate(input: &NutrientSuggestionInput, _refs: &ReferenceData) -> Result<(), String> {
        require_text(&input.name, "Name")
    }
}

/// Daily intake target of one nutrient for one age group (and trimester).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientSuggestionAttribute {
    pub id: i64,
    pub nutrient_suggestion_id: i64,
    pub nutrient_id: i64,
    pub age_group_id: i64,
    #[serde(default)]
    pub trimester: Option<i32>,
    #[serde(default)]
    pub min_energy_percentage: Option<f64>,
    #[serde(default)]
    pub max_energy_percentage: Option<f64>,
    #[serde(default)]
    pub min_value_per_day: Option<f64>,
    #[serde(default)]
    pub max_value_per_day: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientSuggestionAttributeInput {
    pub nutrient_suggestion_id: Option<i64>,
    pub nutrient_id: Option<i64>,
    pub age_group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimester: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_energy_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_energy_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value_per_day: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

fn check_range(min: Option<f64>, max: Option<f64>, what: &str) -> Result<(), String> {
    for v in [min, max].into_iter().flatten() {
        if !v.is_finite() || v < 0.0 {
            return Err(format!("{what} cannot be negative"));
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(format!("Minimum {what} cannot exceed the maximum"));
        }
    }
    Ok(())
}

impl Resource for NutrientSuggestionAttribute {
    type Id = i64;
    type Input = NutrientSuggestionAttributeInput;

    const NAME: &'static str = "Suggestion attribute";
    const SLUG: &'static str = "nutrient-suggestion-attributes";
    const COLLECTION: &'static str = "/api/nutrient-suggestion-attribute";
    const REFERENCES: &'static [ReferenceKind] = &[
        ReferenceKind::NutrientSuggestions,
        ReferenceKind::Nutrients,
        ReferenceKind::AgeGroups,
    ];

    fn label(&self, refs: &ReferenceData) -> String {
        let nutrient = refs
            .nutrient_name(self.nutrient_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Nutrient #{}", self.nutrient_id));
        let ages = refs
            .age_groups
            .iter()
            .find(|g| g.id == self.age_group_id)
            .map(|g| g.range_label())
            .unwrap_or_else(|| format!("group #{}", self.age_group_id));
        format!("{nutrient} {ages}")
    }

    fn to_input(&self) -> NutrientSuggestionAttributeInput {
        NutrientSuggestionAttributeInput {
            nutrient_suggestion_id: Some(self.nutrient_suggestion_id),
            nutrient_id: Some(self.nutrient_id),
            age_group_id: Some(self.age_group_id),
            trimester: self.trimester,
            min_energy_percentage: self.min_energy_percentage,
            max_energy_percentage: self.max_energy_percentage,
            min_value_per_day: self.min_value_per_day,
            max_value_per_day: self.max_value_per_day,
            unit: self.unit.clone().unwrap_or_default(),
            amount: self.amount,
        }
    }

    fn validate(input: &NutrientSuggestionAttributeInput, refs: &ReferenceData) -> Result<(), String> {
        let suggestion_id = input
            .nutrient_suggestion_id
            .ok_or_else(|| "Suggestion is required".to_string())?;
        let nutrient_id = input
            .nutrient_id
            .ok_or_else(|| "Nutrient is required".to_string())?;
        let age_group_id = input
            .age_group_id
            .ok_or_else(|| "Age group is required".to_string())?;

        if !refs.nutrient_suggestions.iter().any(|s| s.id == suggestion_id) {
            return Err("Selected suggestion does not exist".into());
        }
        if refs.nutrient_name(nutrient_id).is_none() {
            return Err("Selected nutrient does not exist".into());
        }
        if !refs.age_groups.iter().any(|g| g.id == age_group_id) {
            return Err("Selected age group does not exist".into());
        }
        if let Some(t) = input.trimester {
            if !(1..=3).contains(&t) {
                return Err("Trimester must be 1, 2 or 3".into());
            }
        }

        check_range(
            input.min_energy_percentage,
            input.max_energy_percentage,
            "energy percentage",
        )?;
        if input
            .max_energy_percentage
            .or(input.min_energy_percentage)
            .is_some_and(|v| v > 100.0)
        {
            return Err("Energy percentage cannot exceed 100".into());
        }
        check_range(input.min_value_per_day, input.max_value_per_day, "value per day")?;

        if let Some(amount) = input.amount {
            if !amount.is_finite() || amount <= 0.0 {
                return Err("Amount must be greater than 0".into());
            }
            require_text(&input.unit, "Unit")?;
        }
        Ok(())
    }
}
