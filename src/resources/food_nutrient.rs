use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{require_positive, require_text, ReferenceData, ReferenceKind, Resource};

pub const FOOD_COLLECTION: &str = "/api/food";

/// Foods are only read here, as the left side of an association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: i64,
    pub name: String,
}

/// How much of a nutrient a food carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    pub food_id: i64,
    pub nutrient_id: i64,
    pub nutrient_equivalent: f64,
    pub unit: String,
    pub amount_per_unit: f64,
    pub total_weight: f64,
    pub food_equivalent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrientInput {
    pub food_id: Option<i64>,
    pub nutrient_id: Option<i64>,
    pub nutrient_equivalent: Option<f64>,
    #[serde(default)]
    pub unit: String,
    pub amount_per_unit: Option<f64>,
    pub total_weight: Option<f64>,
    pub food_equivalent: Option<f64>,
}

/// Composite key, rendered as `{foodId}-{nutrientId}` in routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrientKey {
    pub food_id: i64,
    pub nutrient_id: i64,
}

impl fmt::Display for FoodNutrientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.food_id, self.nutrient_id)
    }
}

impl FromStr for FoodNutrientKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (food, nutrient) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid food-nutrient key {s:?}"))?;
        Ok(Self {
            food_id: food.parse().map_err(|_| format!("invalid food id {food:?}"))?,
            nutrient_id: nutrient
                .parse()
                .map_err(|_| format!("invalid nutrient id {nutrient:?}"))?,
        })
    }
}

impl Resource for FoodNutrient {
    type Id = FoodNutrientKey;
    type Input = FoodNutrientInput;

    const NAME: &'static str = "Food nutrient";
    const SLUG: &'static str = "food-nutrients";
    const COLLECTION: &'static str = "/api/food-nutrient";
    const REFERENCES: &'static [ReferenceKind] = &[ReferenceKind::Foods, ReferenceKind::Nutrients];

    fn label(&self, refs: &ReferenceData) -> String {
        let food = refs
            .food_name(self.food_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Food #{}", self.food_id));
        let nutrient = refs
            .nutrient_name(self.nutrient_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Nutrient #{}", self.nutrient_id));
        format!("{food} {nutrient}")
    }

    fn to_input(&self) -> FoodNutrientInput {
        FoodNutrientInput {
            food_id: Some(self.food_id),
            nutrient_id: Some(self.nutrient_id),
            nutrient_equivalent: Some(self.nutrient_equivalent),
            unit: self.unit.clone(),
            amount_per_unit: Some(self.amount_per_unit),
            total_weight: Some(self.total_weight),
            food_equivalent: Some(self.food_equivalent),
        }
    }

    fn validate(input: &FoodNutrientInput, refs: &ReferenceData) -> Result<(), String> {
        let food_id = input.food_id.ok_or_else(|| "Food is required".to_string())?;
        let nutrient_id = input
            .nutrient_id
            .ok_or_else(|| "Nutrient is required".to_string())?;
        if refs.food_name(food_id).is_none() {
            return Err("Selected food does not exist".into());
        }
        if refs.nutrient_name(nutrient_id).is_none() {
            return Err("Selected nutrient does not exist".into());
        }
        require_text(&input.unit, "Unit")?;
        require_positive(input.nutrient_equivalent, "Nutrient equivalent")?;
        require_positive(input.amount_per_unit, "Amount per unit")?;
        require_positive(input.total_weight, "Total weight")?;
        require_positive(input.food_equivalent, "Food equivalent")?;
        Ok(())
    }

    fn item_path(id: &FoodNutrientKey) -> String {
        format!("{}/{}/{}", Self::COLLECTION, id.food_id, id.nutrient_id)
    }
}
