//! Terminal rendering of survey fields and parsing of typed selections.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use client_core::PageController;
use shared::{
    domain::{InputType, ProfileField, SurveyField},
    protocol::AnswerValue,
};

/// Resolves a typed selection against the field's options.
///
/// Accepts 1-based indices or literal option text, separated by commas.
pub fn parse_selection(input: &str, options: &[String]) -> Result<Vec<String>> {
    let mut picked = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let value = match token.parse::<usize>() {
            Ok(index) => options
                .get(index.wrapping_sub(1))
                .cloned()
                .ok_or_else(|| anyhow!("option {index} is out of range 1..={}", options.len()))?,
            Err(_) => options
                .iter()
                .find(|option| option.as_str() == token)
                .cloned()
                .ok_or_else(|| anyhow!("'{token}' is not one of the options"))?,
        };
        picked.push(value);
    }
    if picked.is_empty() {
        bail!("no option selected");
    }
    Ok(picked)
}

pub fn render_field(page: &PageController, field: &SurveyField) -> String {
    let kind = match field.input_type {
        InputType::SingleChoice => "pick one",
        InputType::MultiChoice => "pick up to 3",
        InputType::FreeText => "optional",
        InputType::Other(_) => "text",
    };
    let mut out = format!("{}. {} ({kind})\n", field.input_num, field.title);
    for (index, option) in field.options.iter().enumerate() {
        let mark = if page.is_checked(field.input_type, field.input_num, option) {
            "x"
        } else {
            " "
        };
        out.push_str(&format!("   [{mark}] {}) {option}\n", index + 1));
    }
    out
}

/// Prints `prompt` and reads one line from `input`. `None` means the input
/// is closed.
pub fn read_line(input: &mut impl BufRead, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Asks one question until the answer parses, then records it.
///
/// Free-form fields are left unanswered on a blank line. Once the input is
/// closed only free-text fields are skipped; any other field fails.
pub fn ask_field(
    page: &mut PageController,
    field: &SurveyField,
    input: &mut impl BufRead,
) -> Result<()> {
    print!("{}", render_field(page, field));
    let free_form = matches!(field.input_type, InputType::FreeText | InputType::Other(_))
        || field.options.is_empty();
    loop {
        let Some(line) = read_line(input, "> ")? else {
            if field.input_type == InputType::FreeText {
                return Ok(());
            }
            bail!("input closed before question {} was answered", field.input_num);
        };
        if free_form {
            if !line.is_empty() {
                page.set_answer(field.input_type, field.input_num, line);
            }
            return Ok(());
        }
        match parse_selection(&line, &field.options) {
            Ok(values) => {
                for value in values {
                    page.set_answer(field.input_type, field.input_num, value);
                }
                if field.input_type == InputType::MultiChoice {
                    print!("{}", render_field(page, field));
                }
                return Ok(());
            }
            Err(err) => println!("{err}"),
        }
    }
}

/// Asks one profile field. A blank line leaves it empty; an unknown option
/// asks again.
pub fn ask_profile_field(
    page: &mut PageController,
    field: &ProfileField,
    input: &mut impl BufRead,
) -> Result<()> {
    let label = if field.options.is_empty() {
        format!("{}. {}: ", field.input_num, field.title)
    } else {
        format!(
            "{}. {} [{}]: ",
            field.input_num,
            field.title,
            field.options.join(" / ")
        )
    };
    let multi = field.input_type == InputType::MultiChoice && !field.options.is_empty();
    loop {
        let Some(line) = read_line(input, &label)? else {
            bail!("input closed before profile field {} was answered", field.input_num);
        };
        let value = if !multi {
            AnswerValue::One(line)
        } else if line.trim().is_empty() {
            AnswerValue::Many(Vec::new())
        } else {
            match parse_selection(&line, &field.options) {
                Ok(values) => AnswerValue::Many(values),
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            }
        };
        page.set_profile_answer(field.input_num, value);
        return Ok(());
    }
}
