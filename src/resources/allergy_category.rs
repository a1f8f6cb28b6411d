use serde::{Deserialize, Serialize};

use super::{require_text, ReferenceData, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyCategoryInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Resource for AllergyCategory {
    type Id = i64;
    type Input = AllergyCategoryInput;

    const NAME: &'static str = "Allergy category";
    const SLUG: &'static str = "allergy-categories";
    const COLLECTION: &'static str = "/api/allergy-category";

    fn label(&self, _refs: &ReferenceData) -> String {
        self.name.clone()
    }

    fn to_input(&self) -> AllergyCategoryInput {
        AllergyCategoryInput {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    fn validate(input: &AllergyCategoryInput, _refs: &ReferenceData) -> Result<(), String> {
        require_text(&input.name, "Name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        let refs = ReferenceData::default();
        let blank = AllergyCategoryInput {
            name: "   ".into(),
            description: "tree nuts".into(),
        };
        assert_eq!(
            AllergyCategory::validate(&blank, &refs),
            Err("Name is required".to_string())
        );
        let ok = AllergyCategoryInput {
            name: "Nuts".into(),
            description: String::new(),
        };
        assert!(AllergyCategory::validate(&ok, &refs).is_ok());
    }

    #[test]
    fn missing_description_decodes_as_none() {
        let cat: AllergyCategory =
            serde_json::from_value(serde_json::json!({ "id": 1, "name": "Dairy" })).unwrap();
        assert_eq!(cat.description, None);
        assert_eq!(cat.to_input().description, "");
    }
}
