use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age and gender estimate for one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgeGender {
    /// Estimated age in years.
    pub age: f64,
    pub gender: Gender,
    /// Probability of `gender`, in `[0.5, 1]` for a binary classifier.
    pub gender_probability: f64,
}
