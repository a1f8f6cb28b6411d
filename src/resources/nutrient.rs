use serde::{Deserialize, Serialize};

use super::{require_text, ReferenceData, ReferenceKind, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientCategoryInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Resource for NutrientCategory {
    type Id = i64;
    type Input = NutrientCategoryInput;

    const NAME: &'static str = "Nutrient category";
    const SLUG: &'static str = "nutrient-categories";
    const COLLECTION: &'static str = "/api/nutrient-category";

    fn label(&self, _refs: &ReferenceData) -> String {
        self.name.clone()
    }

    fn to_input(&self) -> NutrientCategoryInput {
        NutrientCategoryInput {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    fn validate(input: &NutrientCategoryInput, _refs: &ReferenceData) -> Result<(), String> {
        require_text(&input.name, "Name")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrient {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    pub category_id: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub image_url: String,
}

impl Resource for Nutrient {
    type Id = i64;
    type Input = NutrientInput;

    const NAME: &'static str = "Nutrient";
    const SLUG: &'static str = "nutrients";
    const COLLECTION: &'static str = "/api/nutrient";
    const REFERENCES: &'static [ReferenceKind] = &[ReferenceKind::NutrientCategories];

    fn label(&self, _refs: &ReferenceData) -> String {
        self.name.clone()
    }

    fn to_input(&self) -> NutrientInput {
        NutrientInput {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            unit: self.unit.clone().unwrap_or_default(),
            category_id: Some(self.category_id),
            image_url: self.image_url.clone().unwrap_or_default(),
        }
    }

    fn validate(input: &NutrientInput, refs: &ReferenceData) -> Result<(), String> {
        require_text(&input.name, "Name")?;
        require_text(&input.unit, "Unit")?;
        let category_id = input
            .category_id
            .ok_or_else(|| "Category is required".to_string())?;
        if !refs.nutrient_categories.iter().any(|c| c.id == category_id) {
            return Err("Selected category does not exist".into());
        }
        Ok(())
    }
}
