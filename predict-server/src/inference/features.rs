//! Feature layout
//!
//! The JSON body of `/predictSingle` historically used underscored keys
//! (`Blood_Pressure`) while uploaded CSV files use the Pima column headers
//! (`BloodPressure`). [`Feature`] is the single source of truth for both
//! spellings; each surface accepts the other spelling as an alias.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of model inputs
pub const FEATURE_COUNT: usize = 8;

/// Model input, in the column order the classifier was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    Bmi,
    DiabetesPedigreeFunction,
    Age,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Pregnancies,
        Feature::Glucose,
        Feature::BloodPressure,
        Feature::SkinThickness,
        Feature::Insulin,
        Feature::Bmi,
        Feature::DiabetesPedigreeFunction,
        Feature::Age,
    ];

    /// Position in the model's input row
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used in JSON request bodies
    pub fn json_key(self) -> &'static str {
        match self {
            Self::Pregnancies => "Pregnancies",
            Self::Glucose => "Glucose",
            Self::BloodPressure => "Blood_Pressure",
            Self::SkinThickness => "Skin_Thickness",
            Self::Insulin => "Insulin",
            Self::Bmi => "BMI",
            Self::DiabetesPedigreeFunction => "Diabetes_Pedigree_Function",
            Self::Age => "Age",
        }
    }

    /// Header used in uploaded CSV files
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Pregnancies => "Pregnancies",
            Self::Glucose => "Glucose",
            Self::BloodPressure => "BloodPressure",
            Self::SkinThickness => "SkinThickness",
            Self::Insulin => "Insulin",
            Self::Bmi => "BMI",
            Self::DiabetesPedigreeFunction => "DiabetesPedigreeFunction",
            Self::Age => "Age",
        }
    }

    /// Accepted CSV headers, in lookup order
    pub fn column_spellings(self) -> [&'static str; 2] {
        [self.column_name(), self.json_key()]
    }
}

/// One patient record as sent to `/predictSingle`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "Pregnancies", deserialize_with = "coerce_f64")]
    pub pregnancies: f64,
    #[serde(rename = "Glucose", deserialize_with = "coerce_f64")]
    pub glucose: f64,
    #[serde(rename = "Blood_Pressure", alias = "BloodPressure", deserialize_with = "coerce_f64")]
    pub blood_pressure: f64,
    #[serde(rename = "Skin_Thickness", alias = "SkinThickness", deserialize_with = "coerce_f64")]
    pub skin_thickness: f64,
    #[serde(rename = "Insulin", deserialize_with = "coerce_f64")]
    pub insulin: f64,
    #[serde(rename = "BMI", deserialize_with = "coerce_f64")]
    pub bmi: f64,
    #[serde(
        rename = "Diabetes_Pedigree_Function",
        alias = "DiabetesPedigreeFunction",
        deserialize_with = "coerce_f64"
    )]
    pub diabetes_pedigree_function: f64,
    #[serde(rename = "Age", deserialize_with = "coerce_f64")]
    pub age: f64,
}

impl FeatureVector {
    /// Model input row, ordered as [`Feature::ALL`]
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pregnancies,
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.diabetes_pedigree_function,
            self.age,
        ]
    }

    pub fn from_row(row: [f64; FEATURE_COUNT]) -> Self {
        Self {
            pregnancies: row[0],
            glucose: row[1],
            blood_pressure: row[2],
            skin_thickness: row[3],
            insulin: row[4],
            bmi: row[5],
            diabetes_pedigree_function: row[6],
            age: row[7],
        }
    }
}

/// Accepts JSON numbers and numeric strings (`"120"`); nothing else.
fn coerce_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {:?}", text))),
    }
}
