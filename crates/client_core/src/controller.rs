//! Page controller for answering one questionnaire.
//!
//! The page starts in [`PageState::Loading`] and moves to
//! [`PageState::Ready`] once questionnaire data is in the store. Leaving the
//! page (profile page, result page) is reported as a [`Route`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    domain::{InputType, QuestionNumber, QuestionnaireId, SurveyField},
    error::ErrorCode,
    protocol::{AnswerValue, SubmissionRequest},
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    api::{FetchedQuestionnaire, QuestionnaireService},
    error::FetchError,
    navigation::{Notice, ResultKey, Route},
    store::{AppStore, StoreAction},
    validation::{all_profile_fields_blank, first_unsatisfied},
};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    StateChanged(PageState),
    Notice(Notice),
    Navigate(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Stay,
    Navigated(Route),
}

pub struct PageController {
    store: AppStore,
    service: Arc<dyn QuestionnaireService>,
    clock: Arc<dyn Clock>,
    state: PageState,
    route_id: Option<QuestionnaireId>,
    events: broadcast::Sender<PageEvent>,
}

impl PageController {
    pub fn new(store: AppStore, service: Arc<dyn QuestionnaireService>) -> Self {
        Self::with_clock(store, service, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: AppStore,
        service: Arc<dyn QuestionnaireService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store,
            service,
            clock,
            state: PageState::Loading,
            route_id: None,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Hands the store back so a later page visit can reuse cached data.
    pub fn into_store(self) -> AppStore {
        self.store
    }

    pub fn description(&self) -> Option<&str> {
        self.store
            .state()
            .survey_data
            .raw_data
            .get("description")
            .and_then(serde_json::Value::as_str)
    }

    pub fn survey_fields(&self) -> &[SurveyField] {
        &self.store.state().survey_data.survey_fields
    }

    pub fn answer_for(&self, num: QuestionNumber) -> Option<&AnswerValue> {
        self.store.state().survey_answers.survey_answers.get(num)
    }

    /// Entry point for a page visit. Without a usable id the page stays in
    /// `Loading`.
    pub async fn mount(&mut self, route_id: Option<&str>) -> PageOutcome {
        self.set_state(PageState::Loading);

        let Some(id) = route_id.and_then(QuestionnaireId::from_route) else {
            warn!(?route_id, "page mounted without a questionnaire id");
            return PageOutcome::Stay;
        };
        self.route_id = Some(id);

        if self.store.state().survey_data.catid == Some(id) {
            debug!(questionnaire_id = id.0, "reusing cached questionnaire");
            self.set_state(PageState::Ready);
            return PageOutcome::Stay;
        }

        self.fetch(id).await
    }

    /// Remounts when the route points at a different questionnaire.
    pub async fn on_route_change(&mut self, route_id: Option<&str>) -> PageOutcome {
        let next = route_id.and_then(QuestionnaireId::from_route);
        if next.is_some() && next == self.route_id {
            return PageOutcome::Stay;
        }
        self.mount(route_id).await
    }

    /// Fetches the current questionnaire again, ignoring cached data.
    pub async fn reload(&mut self) -> PageOutcome {
        let Some(id) = self.route_id else {
            return PageOutcome::Stay;
        };
        self.set_state(PageState::Loading);
        self.fetch(id).await
    }

    async fn fetch(&mut self, id: QuestionnaireId) -> PageOutcome {
        match self.service.fetch_questionnaire(id).await {
            Ok(fetched) => self.apply_questionnaire(id, fetched),
            Err(err) => self.handle_fetch_error(id, err),
        }
    }

    fn apply_questionnaire(
        &mut self,
        id: QuestionnaireId,
        fetched: FetchedQuestionnaire,
    ) -> PageOutcome {
        let FetchedQuestionnaire { payload, raw } = fetched;
        let window = match payload.window() {
            Ok(window) => window,
            Err(err) => return self.handle_fetch_error(id, err.into()),
        };

        if !window.contains(self.clock.now()) {
            info!(
                questionnaire_id = payload.id.0,
                "questionnaire is outside its open window"
            );
            return self.navigate(Route::Result {
                id: payload.id,
                key: ResultKey::Closed,
            });
        }

        self.store.dispatch(StoreAction::UpdateCatid(payload.id));
        self.store.dispatch(StoreAction::UpdatePrefs(payload.login_questions));
        self.store.dispatch(StoreAction::UpdateSurfs(payload.invest_questions));
        self.store.dispatch(StoreAction::UpdateRawData(raw));
        self.set_state(PageState::Ready);
        info!(questionnaire_id = payload.id.0, "questionnaire loaded");

        if payload.user_required {
            return self.navigate(Route::Profile(payload.id));
        }
        PageOutcome::Stay
    }

    fn handle_fetch_error(&mut self, id: QuestionnaireId, err: FetchError) -> PageOutcome {
        match err {
            FetchError::Server(api_error) if api_error.code == ErrorCode::NotFound => {
                info!(questionnaire_id = id.0, "questionnaire not found");
                self.notify(Notice::Info(api_error.message));
                self.navigate(Route::Result {
                    id,
                    key: ResultKey::NotFound,
                })
            }
            err => {
                warn!(questionnaire_id = id.0, error = %err, "questionnaire fetch failed");
                self.notify(Notice::unknown_error());
                PageOutcome::Stay
            }
        }
    }

    /// Records one answer interaction and writes the whole map back to the
    /// store.
    pub fn set_answer(
        &mut self,
        input_type: InputType,
        num: QuestionNumber,
        value: impl Into<String>,
    ) {
        let mut answers = self.store.state().survey_answers.survey_answers.clone();
        answers.set_answer(input_type, num, value);
        self.store.dispatch(StoreAction::UpdateSurveyAnswers(answers));
    }

    pub fn is_checked(&self, input_type: InputType, num: QuestionNumber, value: &str) -> bool {
        self.store
            .state()
            .survey_answers
            .survey_answers
            .is_checked(input_type, num, value)
    }

    pub fn set_profile_answer(&mut self, num: QuestionNumber, value: AnswerValue) {
        let mut prefs = self.store.state().survey_answers.prefs_answers.clone();
        prefs.insert(num, value);
        self.store.dispatch(StoreAction::UpdatePrefsAnswers(prefs));
    }

    /// Validates the answers and posts them.
    ///
    /// A missing required answer blocks the submission with a notice naming
    /// the first such question. When the questionnaire requires a profile and
    /// every profile field is blank, the page moves to the profile page
    /// instead. A failed post is only logged.
    pub async fn submit(&mut self) -> PageOutcome {
        if self.state != PageState::Ready {
            debug!("submit ignored while loading");
            return PageOutcome::Stay;
        }
        let Some(catid) = self.store.state().survey_data.catid else {
            return PageOutcome::Stay;
        };

        let state = self.store.state();
        if let Some(field) = first_unsatisfied(
            &state.survey_data.survey_fields,
            &state.survey_answers.survey_answers,
        ) {
            let num = field.input_num;
            info!(questionnaire_id = catid.0, question = num.0, "submission blocked");
            self.notify(Notice::incomplete_question(num));
            return PageOutcome::Stay;
        }

        if state.survey_data.user_required() {
            let mut prefs = state.survey_answers.prefs_answers.clone();
            prefs.flatten_lists();
            let all_blank = all_profile_fields_blank(&state.survey_data.pre_fields, &prefs);
            self.store.dispatch(StoreAction::UpdatePrefsAnswers(prefs));
            if all_blank {
                self.notify(Notice::profile_required());
                return self.navigate(Route::Profile(catid));
            }
        }

        let answers = &self.store.state().survey_answers;
        let request = SubmissionRequest {
            userinfo: answers.prefs_answers.as_map().clone(),
            answers: answers.survey_answers.as_map().clone(),
        };

        match self.service.submit_answers(catid, &request).await {
            Ok(()) => {
                self.notify(Notice::submitted());
                self.store.dispatch(StoreAction::ClearAllAnswers);
                self.navigate(Route::Result {
                    id: catid,
                    key: ResultKey::Success,
                })
            }
            Err(err) => {
                error!(questionnaire_id = catid.0, error = %err, "answer submission failed");
                PageOutcome::Stay
            }
        }
    }

    fn set_state(&mut self, state: PageState) {
        if self.state != state {
            self.state = state;
            let _ = self.events.send(PageEvent::StateChanged(state));
        }
    }

    fn notify(&self, notice: Notice) {
        let _ = self.events.send(PageEvent::Notice(notice));
    }

    fn navigate(&self, route: Route) -> PageOutcome {
        info!(%route, "navigating away from questionnaire page");
        let _ = self.events.send(PageEvent::Navigate(route));
        PageOutcome::Navigated(route)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
