//! Entities managed through the portal and the capability set a list page
//! needs from each of them.

use std::{fmt::Debug, fmt::Display, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::api::{self, RestApi};
use crate::error::PortalResult;

pub mod age_group;
pub mod allergy_category;
pub mod food_nutrient;
pub mod nutrient;
pub mod nutrient_suggestion;

pub use age_group::AgeGroup;
pub use allergy_category::AllergyCategory;
pub use food_nutrient::{Food, FoodNutrient};
pub use nutrient::{Nutrient, NutrientCategory};
pub use nutrient_suggestion::{NutrientSuggestion, NutrientSuggestionAttribute};

/// A record type with a management page backed by a REST collection.
pub trait Resource:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: Clone + Debug + PartialEq + Display + FromStr + Serialize + Send + Sync + 'static;
    /// Form payload; `Default` is the empty form.
    type Input: Clone + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Human name used in notifications ("Age group created").
    const NAME: &'static str;
    /// Route segment of the management page.
    const SLUG: &'static str;
    /// Upstream collection path.
    const COLLECTION: &'static str;
    /// Reference collections fetched together with the list.
    const REFERENCES: &'static [ReferenceKind] = &[];

    /// The field the search box filters on.
    fn label(&self, refs: &ReferenceData) -> String;

    fn to_input(&self) -> Self::Input;

    /// Client-side checks run before any request is issued.
    fn validate(input: &Self::Input, refs: &ReferenceData) -> Result<(), String>;

    fn item_path(id: &Self::Id) -> String {
        format!("{}/{}", Self::COLLECTION, id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    NutrientCategories,
    Foods,
    Nutrients,
    AgeGroups,
    NutrientSuggestions,
}

/// Related collections a page needs for its selects and reference checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nutrient_categories: Vec<NutrientCategory>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub foods: Vec<Food>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nutrients: Vec<Nutrient>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub age_groups: Vec<AgeGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nutrient_suggestions: Vec<NutrientSuggestion>,
}

impl ReferenceData {
    pub async fn fetch(
        client: &dyn RestApi,
        token: Option<&str>,
        kinds: &[ReferenceKind],
    ) -> PortalResult<Self> {
        let mut refs = Self::default();
        for kind in kinds {
            match kind {
                ReferenceKind::NutrientCategories => {
                    refs.nutrient_categories =
                        api::get_json(client, NutrientCategory::COLLECTION, token).await?
                }
                ReferenceKind::Foods => {
                    refs.foods = api::get_json(client, food_nutrient::FOOD_COLLECTION, token).await?
                }
                ReferenceKind::Nutrients => {
                    refs.nutrients = api::get_json(client, Nutrient::COLLECTION, token).await?
                }
                ReferenceKind::AgeGroups => {
                    refs.age_groups = api::get_json(client, AgeGroup::COLLECTION, token).await?
                }
                ReferenceKind::NutrientSuggestions => {
                    refs.nutrient_suggestions =
                        api::get_json(client, NutrientSuggestion::COLLECTION, token).await?
                }
            }
        }
        Ok(refs)
    }

    pub fn food_name(&self, id: i64) -> Option<&str> {
        self.foods
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.name.as_str())
    }

    pub fn nutrient_name(&self, id: i64) -> Option<&str> {
        self.nutrients
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.name.as_str())
    }
}

/// Shared check for required text fields.
pub(crate) fn require_text(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

pub(crate) fn require_positive(value: Option<f64>, field: &str) -> Result<f64, String> {
    match value {
        None => Err(format!("{field} is required")),
        Some(v) if !v.is_finite() || v <= 0.0 => Err(format!("{field} must be greater than 0")),
        Some(v) => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{fake::FakeApi, Method};
    use serde_json::json;

    #[tokio::test]
    async fn fetch_loads_only_requested_kinds() {
        let api = FakeApi::new();
        api.ok(
            Method::Get,
            "/api/nutrient-category",
            json!({ "data": [{ "id": 1, "name": "Vitamins" }] }),
        );
        api.ok(
            Method::Get,
            "/api/food",
            json!([{ "id": 4, "name": "Spinach" }]),
        );

        let refs = ReferenceData::fetch(
            &api,
            Some("tok"),
            &[ReferenceKind::NutrientCategories, ReferenceKind::Foods],
        )
        .await
        .unwrap();

        assert_eq!(refs.nutrient_categories.len(), 1);
        assert_eq!(refs.food_name(4), Some("Spinach"));
        assert!(refs.nutrients.is_empty());
        assert_eq!(api.count(Method::Get, "/api/nutrient"), 0);
    }

    #[test]
    fn require_positive_rejects_zero_and_missing() {
        assert!(require_positive(Some(0.0), "Total weight").is_err());
        assert!(require_positive(Some(-1.0), "Total weight").is_err());
        assert!(require_positive(None, "Total weight").is_err());
        assert_eq!(require_positive(Some(0.5), "Total weight"), Ok(0.5));
    }
}
