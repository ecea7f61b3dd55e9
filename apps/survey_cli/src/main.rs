use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    load_settings, AppStore, PageController, PageEvent, PageOutcome, Route, SurveyApi,
};
use shared::{
    domain::InputType,
    protocol::{AnswerValue, SubmissionRequest},
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_subscriber::EnvFilter;

mod prompt;

#[derive(Parser, Debug)]
struct Args {
    /// Questionnaire id, as in `/ques/{id}`.
    id: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    /// JSON file shaped like the submission body: `{ "userinfo": {..}, "answers": {..} }`.
    #[arg(long)]
    answers_file: Option<PathBuf>,
}

fn print_events(rx: &mut broadcast::Receiver<PageEvent>) {
    loop {
        match rx.try_recv() {
            Ok(PageEvent::Notice(notice)) => println!("* {}", notice.text()),
            Ok(PageEvent::Navigate(route)) => println!("-> {route}"),
            Ok(PageEvent::StateChanged(state)) => tracing::debug!(?state, "page state"),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return,
        }
    }
}

fn apply_answers_file(page: &mut PageController, path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file '{}'", path.display()))?;
    let prefilled: SubmissionRequest = serde_json::from_str(&raw)
        .with_context(|| format!("invalid answers file '{}'", path.display()))?;

    for (num, value) in prefilled.userinfo {
        page.set_profile_answer(num, value);
    }
    let fields = page.survey_fields().to_vec();
    for (num, value) in prefilled.answers {
        let input_type = fields
            .iter()
            .find(|field| field.input_num == num)
            .map(|field| field.input_type)
            .unwrap_or(InputType::FreeText);
        match value {
            AnswerValue::One(value) => page.set_answer(input_type, num, value),
            AnswerValue::Many(values) => {
                for value in values {
                    page.set_answer(input_type, num, value);
                }
            }
        }
    }
    Ok(())
}

/// Stands in for the profile page: asks every profile field once.
fn collect_profile(page: &mut PageController, input: &mut impl BufRead) -> Result<()> {
    let pre_fields = page.store().state().survey_data.pre_fields.clone();
    if pre_fields.is_empty() {
        bail!("questionnaire requires a profile but lists no profile fields");
    }
    println!("Please fill in your profile first.");
    for field in &pre_fields {
        prompt::ask_profile_field(page, field, input)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings()?;
    if let Some(base_url) = args.base_url {
        settings.base_url = client_core::config::normalize_base_url(&base_url)?;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api = Arc::new(SurveyApi::new(settings.base_url.clone()));
    let mut page = PageController::new(AppStore::new(settings.base_url), api);
    let mut rx = page.subscribe_events();
    let mut input = io::stdin().lock();

    let mut outcome = page.mount(args.id.as_deref()).await;
    print_events(&mut rx);

    if let PageOutcome::Navigated(Route::Profile(_)) = outcome {
        collect_profile(&mut page, &mut input)?;
        outcome = PageOutcome::Stay;
    }
    if let PageOutcome::Navigated(route) = outcome {
        println!("Questionnaire is not available here ({route}).");
        return Ok(());
    }
    if page.state() != client_core::PageState::Ready {
        println!("Questionnaire could not be loaded.");
        return Ok(());
    }

    if let Some(description) = page.description() {
        println!("{description}\n");
    }
    if let Some(path) = &args.answers_file {
        apply_answers_file(&mut page, path)?;
    }

    let unanswered: Vec<_> = page
        .survey_fields()
        .iter()
        .filter(|field| page.answer_for(field.input_num).is_none())
        .cloned()
        .collect();
    for field in &unanswered {
        prompt::ask_field(&mut page, field, &mut input)?;
    }

    loop {
        let outcome = page.submit().await;
        print_events(&mut rx);
        match outcome {
            PageOutcome::Navigated(Route::Profile(_)) => collect_profile(&mut page, &mut input)?,
            PageOutcome::Navigated(_) => return Ok(()),
            PageOutcome::Stay => {
                let state = page.store().state();
                let pending: Vec<_> = client_core::validation::unsatisfied_fields(
                    &state.survey_data.survey_fields,
                    &state.survey_answers.survey_answers,
                )
                .into_iter()
                .cloned()
                .collect();
                if pending.is_empty() {
                    let retry =
                        prompt::read_line(&mut input, "Submission failed. Retry? [y/N] ")?;
                    if !retry.is_some_and(|answer| answer.eq_ignore_ascii_case("y")) {
                        return Ok(());
                    }
                }
                for field in &pending {
                    prompt::ask_field(&mut page, field, &mut input)?;
                }
            }
        }
    }
}
