//! Application state shared by the survey pages.
//!
//! Every mutation goes through [`AppStore::dispatch`] with a [`StoreAction`],
//! so the store has exactly one write path.

use shared::{
    domain::{ProfileField, QuestionnaireId, SurveyField},
    protocol::json_truthy,
};

use crate::answers::{AnswerMap, ProfileAnswers};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyData {
    pub catid: Option<QuestionnaireId>,
    pub pre_fields: Vec<ProfileField>,
    pub survey_fields: Vec<SurveyField>,
    pub raw_data: serde_json::Value,
}

impl SurveyData {
    /// Whether the raw payload asks for profile fields before the survey.
    pub fn user_required(&self) -> bool {
        self.raw_data
            .get("user_required")
            .is_some_and(json_truthy)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyAnswers {
    pub survey_answers: AnswerMap,
    pub prefs_answers: ProfileAnswers,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub base_url: String,
    pub survey_data: SurveyData,
    pub survey_answers: SurveyAnswers,
}

#[derive(Debug, Clone)]
pub enum StoreAction {
    UpdateCatid(QuestionnaireId),
    UpdatePrefs(Vec<ProfileField>),
    UpdateSurfs(Vec<SurveyField>),
    UpdateRawData(serde_json::Value),
    UpdateSurveyAnswers(AnswerMap),
    UpdatePrefsAnswers(ProfileAnswers),
    ClearAllAnswers,
    SetBaseUrl(String),
}

impl StoreAction {
    fn name(&self) -> &'static str {
        match self {
            Self::UpdateCatid(_) => "update_catid",
            Self::UpdatePrefs(_) => "update_prefs",
            Self::UpdateSurfs(_) => "update_surfs",
            Self::UpdateRawData(_) => "update_raw_data",
            Self::UpdateSurveyAnswers(_) => "update_survey_answers",
            Self::UpdatePrefsAnswers(_) => "update_prefs_answers",
            Self::ClearAllAnswers => "clear_all_answers",
            Self::SetBaseUrl(_) => "set_base_url",
        }
    }
}

#[derive(Debug, Default)]
pub struct AppStore {
    state: AppState,
}

impl AppStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            state: AppState {
                base_url: base_url.into(),
                ..AppState::default()
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: StoreAction) {
        tracing::debug!(action = action.name(), "store dispatch");
        let state = &mut self.state;
        match action {
            StoreAction::UpdateCatid(catid) => state.survey_data.catid = Some(catid),
            StoreAction::UpdatePrefs(fields) => state.survey_data.pre_fields = fields,
            StoreAction::UpdateSurfs(fields) => state.survey_data.survey_fields = fields,
            StoreAction::UpdateRawData(raw) => state.survey_data.raw_data = raw,
            StoreAction::UpdateSurveyAnswers(answers) => {
                state.survey_answers.survey_answers = answers
            }
            StoreAction::UpdatePrefsAnswers(answers) => {
                state.survey_answers.prefs_answers = answers
            }
            StoreAction::ClearAllAnswers => state.survey_answers = SurveyAnswers::default(),
            StoreAction::SetBaseUrl(base_url) => state.base_url = base_url,
        }
    }
}
