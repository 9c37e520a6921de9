use super::extract::Question;
use crate::error::AskError;
use std::collections::HashMap;

/// Mutable answers for one request, scoped to a single presentation and
/// passed into composition explicitly rather than captured by closures.
#[derive(Debug, Default)]
pub struct AnswerSheet {
    selections: HashMap<usize, Vec<usize>>,
    texts: HashMap<usize, String>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click on `option` for `question`. Single-select replaces
    /// the selection; multi-select toggles membership.
    pub fn select(&mut self, question: usize, option: usize, multi_select: bool) {
        let selected = self.selections.entry(question).or_default();
        if multi_select {
            if let Some(position) = selected.iter().position(|&index| index == option) {
                selected.remove(position);
            } else {
                selected.push(option);
            }
        } else {
            selected.clear();
            selected.push(option);
        }
    }

    pub fn set_selection(&mut self, question: usize, options: Vec<usize>) {
        self.selections.insert(question, options);
    }

    pub fn set_text(&mut self, question: usize, text: impl Into<String>) {
        self.texts.insert(question, text.into());
    }

    pub fn selected(&self, question: usize) -> &[usize] {
        self.selections
            .get(&question)
            .map_or(&[], Vec::as_slice)
    }
}

/// Title used both in the rendered form and in composed answers.
#[must_use]
pub fn question_title(question: &Question, index: usize) -> String {
    match question.header.as_deref() {
        Some(header) if !header.is_empty() => header.to_string(),
        _ => format!("Question {}", index + 1),
    }
}

/// Compose the submission string for one request.
///
/// Every question must yield a non-empty answer or composition fails with
/// the first offender. A single question collapses to its bare answer;
/// multiple questions become `"<title>: <answer>"` lines.
pub fn compose_answer(questions: &[Question], sheet: &AnswerSheet) -> Result<String, AskError> {
    let mut parts = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let title = question_title(question, index);
        let answer = if question.options.is_empty() {
            sheet
                .texts
                .get(&index)
                .map(|text| text.trim().to_string())
                .unwrap_or_default()
        } else {
            sheet
                .selected(index)
                .iter()
                .filter_map(|&option| question.options.get(option))
                .map(|option| option.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
                .trim()
                .to_string()
        };

        if answer.is_empty() {
            return Err(AskError::Unanswered { title });
        }
        parts.push((title, answer));
    }

    if parts.len() == 1 {
        return Ok(parts.remove(0).1);
    }
    Ok(parts
        .into_iter()
        .map(|(title, answer)| format!("{title}: {answer}"))
        .collect::<Vec<_>>()
        .join("\n"))
}
