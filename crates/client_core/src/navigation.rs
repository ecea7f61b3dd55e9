//! Navigation targets and user-facing notices emitted by the page controller.

use std::fmt;

use shared::domain::{QuestionNumber, QuestionnaireId};

/// Tag carried by the result page's `key` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKey {
    Success = 1,
    Closed = 2,
    NotFound = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Profile collection page shown before the survey.
    Profile(QuestionnaireId),
    Result { id: QuestionnaireId, key: ResultKey },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Profile(id) => format!("/prefs/{id}"),
            Self::Result { id, key } => format!("/result/{id}?key={}", *key as u8),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Success(text) => text,
        }
    }

    pub fn incomplete_question(num: QuestionNumber) -> Self {
        Self::Info(format!("please complete question {num} before submitting"))
    }

    pub fn profile_required() -> Self {
        Self::Info("please complete the required profile information".to_string())
    }

    pub fn unknown_error() -> Self {
        Self::Info("unknown error".to_string())
    }

    pub fn submitted() -> Self {
        Self::Success("submitted successfully".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_render_paths() {
        assert_eq!(Route::Profile(QuestionnaireId(3)).path(), "/prefs/3");
        assert_eq!(
            Route::Result {
                id: QuestionnaireId(3),
                key: ResultKey::Success
            }
            .path(),
            "/result/3?key=1"
        );
        assert_eq!(
            Route::Result {
                id: QuestionnaireId(8),
                key: ResultKey::Closed
            }
            .to_string(),
            "/result/8?key=2"
        );
        assert_eq!(
            Route::Result {
                id: QuestionnaireId(8),
                key: ResultKey::NotFound
            }
            .path(),
            "/result/8?key=3"
        );
    }
}
