use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::{ProfileField, QuestionNumber, QuestionnaireId, SurveyField};

/// Success body of `GET /ques/{id}`. `data` stays untyped so the raw payload
/// can be kept alongside the parsed view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionnaireEnvelope {
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnairePayload {
    pub id: QuestionnaireId,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub login_questions: Vec<ProfileField>,
    #[serde(default)]
    pub invest_questions: Vec<SurveyField>,
    #[serde(default, deserialize_with = "flag_from_any")]
    pub user_required: bool,
}

impl QuestionnairePayload {
    pub fn window(&self) -> Result<SurveyWindow, TimestampError> {
        Ok(SurveyWindow {
            start: parse_optional_timestamp(self.start_at.as_deref())?,
            end: parse_optional_timestamp(self.end_at.as_deref())?,
        })
    }
}

/// JavaScript truthiness for a JSON value: `null`, `false`, `0` and `""` are
/// falsy, everything else is truthy.
pub fn json_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

fn flag_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(json_truthy))
}

/// Opening window of a questionnaire. A missing bound leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl SurveyWindow {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let before_start = self.start.is_some_and(|start| now < start);
        let after_end = self.end.is_some_and(|end| now > end);
        !before_start && !after_end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp '{raw}'")]
pub struct TimestampError {
    pub raw: String,
}

fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, TimestampError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_timestamp(raw).map(Some),
    }
}

/// RFC 3339, or a naive `YYYY-MM-DD[ HH:MM:SS]` read as local wall time.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let invalid = || TimestampError {
        raw: raw.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(invalid)?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(invalid)
}

/// Failure body returned by the questionnaire endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: String,
}

/// Stored answer for one question: a single value or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(Vec<String>),
}

impl AnswerValue {
    /// Mirrors JavaScript truthiness: empty strings are falsy, lists never are.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::One(value) => !value.is_empty(),
            Self::Many(_) => true,
        }
    }
}

/// Body of `POST /ques/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub userinfo: BTreeMap<QuestionNumber, AnswerValue>,
    pub answers: BTreeMap<QuestionNumber, AnswerValue>,
}

impl SubmissionRequest {
    /// Flattens the request into bracket-notation form pairs:
    /// `answers[3]=x`, `answers[4][0]=a`.
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_section(&mut pairs, "userinfo", &self.userinfo);
        push_section(&mut pairs, "answers", &self.answers);
        pairs
    }
}

fn push_section(
    pairs: &mut Vec<(String, String)>,
    section: &str,
    values: &BTreeMap<QuestionNumber, AnswerValue>,
) {
    for (num, value) in values {
        match value {
            AnswerValue::One(value) => pairs.push((format!("{section}[{num}]"), value.clone())),
            AnswerValue::Many(items) => {
                for (index, item) in items.iter().enumerate() {
                    pairs.push((format!("{section}[{num}][{index}]"), item.clone()));
                }
            }
        }
    }
}
