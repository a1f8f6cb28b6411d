use serde::{Deserialize, Serialize};

use super::{ReferenceData, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroup {
    pub id: i64,
    pub from_age: i32,
    pub to_age: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupInput {
    pub from_age: Option<i32>,
    pub to_age: Option<i32>,
}

impl AgeGroup {
    pub fn range_label(&self) -> String {
        format!("{}-{}", self.from_age, self.to_age)
    }
}

impl Resource for AgeGroup {
    type Id = i64;
    type Input = AgeGroupInput;

    const NAME: &'static str = "Age group";
    const SLUG: &'static str = "age-groups";
    const COLLECTION: &'static str = "/api/age-group";

    fn label(&self, _refs: &ReferenceData) -> String {
        self.range_label()
    }

    fn to_input(&self) -> AgeGroupInput {
        AgeGroupInput {
            from_age: Some(self.from_age),
            to_age: Some(self.to_age),
        }
    }

    fn validate(input: &AgeGroupInput, _refs: &ReferenceData) -> Result<(), String> {
        let (Some(from), Some(to)) = (input.from_age, input.to_age) else {
            return Err("From age and to age are required".into());
        };
        if from < 0 || to < 0 {
            return Err("Ages cannot be negative".into());
        }
        if from >= to {
            return Err("From age must be less than to age".into());
        }
        Ok(())
    }
}
