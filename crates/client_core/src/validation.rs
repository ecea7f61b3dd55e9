//! Presence checks run before a submission.

use shared::{
    domain::{InputType, ProfileField, SurveyField},
    protocol::AnswerValue,
};

use crate::answers::{AnswerMap, ProfileAnswers};

fn is_satisfied(field: &SurveyField, answers: &AnswerMap) -> bool {
    match (field.input_type, answers.get(field.input_num)) {
        (InputType::FreeText, _) => true,
        (InputType::MultiChoice, Some(AnswerValue::Many(list))) => !list.is_empty(),
        (InputType::MultiChoice, _) => false,
        (_, answer) => answer.is_some_and(AnswerValue::is_truthy),
    }
}

/// Fields that still need an answer, in questionnaire order.
pub fn unsatisfied_fields<'a>(
    fields: &'a [SurveyField],
    answers: &AnswerMap,
) -> Vec<&'a SurveyField> {
    fields
        .iter()
        .filter(|field| !is_satisfied(field, answers))
        .collect()
}

/// The unsatisfied field with the lowest question number, whatever order the
/// questionnaire lists its fields in.
pub fn first_unsatisfied<'a>(
    fields: &'a [SurveyField],
    answers: &AnswerMap,
) -> Option<&'a SurveyField> {
    fields
        .iter()
        .filter(|field| !is_satisfied(field, answers))
        .min_by_key(|field| field.input_num)
}

/// True only when every profile field is blank. A partially filled profile
/// passes.
pub fn all_profile_fields_blank(pre_fields: &[ProfileField], prefs: &ProfileAnswers) -> bool {
    pre_fields.iter().all(|field| prefs.is_blank(field.input_num))
}

#[cfg(test)]
mod tests {
    use shared::domain::QuestionNumber;

    use super::*;

    fn field(num: u32, input_type: InputType) -> SurveyField {
        SurveyField {
            input_num: QuestionNumber(num),
            input_type,
            title: format!("Q{num}"),
            options: Vec::new(),
        }
    }

    fn sample_fields() -> Vec<SurveyField> {
        vec![
            field(1, InputType::SingleChoice),
            field(2, InputType::MultiChoice),
            field(3, InputType::FreeText),
        ]
    }

    fn answers(entries: Vec<(u32, AnswerValue)>) -> AnswerMap {
        entries
            .into_iter()
            .map(|(num, value)| (QuestionNumber(num), value))
            .collect()
    }

    #[test]
    fn missing_single_choice_is_cited_first() {
        let fields = sample_fields();
        let answers = answers(vec![(2, AnswerValue::Many(vec!["a".into()]))]);
        let first = first_unsatisfied(&fields, &answers).expect("blocked");
        assert_eq!(first.input_num, QuestionNumber(1));
    }

    #[test]
    fn empty_multi_choice_list_is_unsatisfied() {
        let fields = sample_fields();
        let answers = answers(vec![
            (1, AnswerValue::One("x".into())),
            (2, AnswerValue::Many(Vec::new())),
        ]);
        let first = first_unsatisfied(&fields, &answers).expect("blocked");
        assert_eq!(first.input_num, QuestionNumber(2));
    }

    #[test]
    fn lowest_question_number_is_cited_regardless_of_field_order() {
        let fields = vec![
            field(5, InputType::SingleChoice),
            field(2, InputType::MultiChoice),
        ];
        let first = first_unsatisfied(&fields, &AnswerMap::new()).expect("blocked");
        assert_eq!(first.input_num, QuestionNumber(2));

        let pending: Vec<_> = unsatisfied_fields(&fields, &AnswerMap::new())
            .into_iter()
            .map(|field| field.input_num)
            .collect();
        assert_eq!(pending, vec![QuestionNumber(5), QuestionNumber(2)]);
    }

    #[test]
    fn free_text_never_blocks() {
        let fields = sample_fields();
        let answers = answers(vec![
            (1, AnswerValue::One("x".into())),
            (2, AnswerValue::Many(vec!["a".into()])),
        ]);
        assert!(unsatisfied_fields(&fields, &answers).is_empty());
    }

    #[test]
    fn unknown_type_needs_truthy_answer() {
        let fields = vec![field(7, InputType::Other(5))];
        assert_eq!(unsatisfied_fields(&fields, &AnswerMap::new()).len(), 1);
        let blank = answers(vec![(7, AnswerValue::One(String::new()))]);
        assert_eq!(unsatisfied_fields(&fields, &blank).len(), 1);
        let filled = answers(vec![(7, AnswerValue::One("ok".into()))]);
        assert!(unsatisfied_fields(&fields, &filled).is_empty());
    }

    #[test]
    fn profile_check_only_blocks_when_every_field_is_blank() {
        let pre_fields = vec![field(1, InputType::FreeText), field(2, InputType::FreeText)];
        assert!(all_profile_fields_blank(&pre_fields, &AnswerMap::new()));

        let partial = answers(vec![(1, AnswerValue::One("Ada".into()))]);
        assert!(!all_profile_fields_blank(&pre_fields, &partial));

        let blank_strings = answers(vec![
            (1, AnswerValue::One(String::new())),
            (2, AnswerValue::One(String::new())),
        ]);
        assert!(all_profile_fields_blank(&pre_fields, &blank_strings));
    }
}
