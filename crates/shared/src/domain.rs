use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident, $repr:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub $repr);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(QuestionnaireId, i64);
id_newtype!(QuestionNumber, u32);

impl QuestionnaireId {
    /// Parses a route segment such as the `:id` in `/ques/:id`.
    pub fn from_route(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

/// Input control of a field, carried on the wire as `1`, `2`, `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InputType {
    SingleChoice,
    MultiChoice,
    FreeText,
    Other(u8),
}

impl From<u8> for InputType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::SingleChoice,
            2 => Self::MultiChoice,
            3 => Self::FreeText,
            other => Self::Other(other),
        }
    }
}

impl From<InputType> for u8 {
    fn from(value: InputType) -> Self {
        match value {
            InputType::SingleChoice => 1,
            InputType::MultiChoice => 2,
            InputType::FreeText => 3,
            InputType::Other(other) => other,
        }
    }
}

/// A question shown on the survey page or on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyField {
    pub input_num: QuestionNumber,
    pub input_type: InputType,
    #[serde(default, alias = "input_title")]
    pub title: String,
    #[serde(default, alias = "input_options")]
    pub options: Vec<String>,
}

/// Profile fields have the same shape as survey fields.
pub type ProfileField = SurveyField;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_type_keeps_unknown_codes() {
        let parsed: InputType = serde_json::from_str("7").expect("parse");
        assert_eq!(parsed, InputType::Other(7));
        assert_eq!(serde_json::to_string(&parsed).expect("encode"), "7");
    }

    #[test]
    fn field_accepts_prefixed_aliases() {
        let field: SurveyField = serde_json::from_str(
            r#"{"input_num":4,"input_type":2,"input_title":"Pets","input_options":["cat","dog"]}"#,
        )
        .expect("parse");
        assert_eq!(field.input_num, QuestionNumber(4));
        assert_eq!(field.input_type, InputType::MultiChoice);
        assert_eq!(field.title, "Pets");
        assert_eq!(field.options, vec!["cat", "dog"]);
    }

    #[test]
    fn route_id_rejects_garbage() {
        assert_eq!(QuestionnaireId::from_route("12"), Some(QuestionnaireId(12)));
        assert_eq!(QuestionnaireId::from_route("abc"), None);
        assert_eq!(QuestionnaireId::from_route(""), None);
    }
}
