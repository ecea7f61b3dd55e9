//! Client side of the questionnaire page: fetch, answer, validate, submit.

pub mod answers;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod store;
pub mod validation;

pub use answers::{AnswerMap, ProfileAnswers, MAX_MULTI_CHOICES};
pub use api::{FetchedQuestionnaire, QuestionnaireService, SurveyApi};
pub use config::{load_settings, ClientSettings};
pub use controller::{Clock, PageController, PageEvent, PageOutcome, PageState, SystemClock};
pub use error::{FetchError, SubmitError};
pub use navigation::{Notice, ResultKey, Route};
pub use store::{AppState, AppStore, StoreAction};
