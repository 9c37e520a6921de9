use super::style::Palette;
use crate::app::{AskOutcome, AskPresenter};
use crate::ask::{AnswerSheet, AskQueueEntry, AskRequest, compose_answer, question_title};
use crate::config::Theme;
use dialoguer::{Input, MultiSelect, Select};

/// Interactive presenter: one prompt flow per request in the entry.
///
/// Esc on any prompt skips the rest of that request's sub-form; skipping
/// every request dismisses the presentation. The first request whose
/// answers compose successfully is submitted, which closes the entry.
pub struct DialoguerPresenter {
    palette: Palette,
}

impl DialoguerPresenter {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            palette: Palette::new(theme),
        }
    }

    /// Fill one request's answer sheet. `None` means the user backed out.
    fn fill_sheet(&self, request: &AskRequest) -> Option<AnswerSheet> {
        let mut sheet = AnswerSheet::new();

        for (index, question) in request.questions.iter().enumerate() {
            let title = question_title(question, index);
            println!("{}", self.palette.header(&title));
            println!(
                "{}",
                question
                    .question
                    .as_deref()
                    .unwrap_or("Please provide your answer.")
            );

            if question.options.is_empty() {
                let answer: String = Input::new()
                    .with_prompt("answer")
                    .allow_empty(true)
                    .interact_text()
                    .ok()?;
                sheet.set_text(index, answer);
                continue;
            }

            let labels: Vec<String> = question
                .options
                .iter()
                .map(|option| match option.description.as_deref() {
                    Some(description) => format!("{} - {description}", option.label),
                    None => option.label.clone(),
                })
                .collect();

            if question.multi_select {
                let picked = MultiSelect::new().items(&labels).interact_opt().ok()??;
                sheet.set_selection(index, picked);
            } else {
                let picked = Select::new().items(&labels).interact_opt().ok()??;
                sheet.set_selection(index, vec![picked]);
            }
        }
        Some(sheet)
    }
}

impl AskPresenter for DialoguerPresenter {
    fn present(&mut self, entry: &AskQueueEntry) -> AskOutcome {
        for (request_index, request) in entry.requests.iter().enumerate() {
            if entry.requests.len() > 1 {
                println!(
                    "{}",
                    self.palette
                        .accent(&format!("Request {}", request_index + 1))
                );
            }

            loop {
                let Some(sheet) = self.fill_sheet(request) else {
                    // Backed out of this sub-form; fall through to the next
                    // request, or dismiss when none remain.
                    break;
                };
                match compose_answer(&request.questions, &sheet) {
                    Ok(answer) => return AskOutcome::Submit { answer },
                    Err(error) => {
                        // Validation is local and recoverable: the form
                        // stays open for another attempt.
                        println!("{}", self.palette.error(&error.to_string()));
                        println!(
                            "{}",
                            self.palette
                                .dim("Please answer all questions before submitting.")
                        );
                    }
                }
            }
        }
        AskOutcome::Dismissed
    }
}
