//! Detection, sequencing and answering of embedded interactive questions.

mod answer;
mod extract;
mod sequencer;

pub use answer::{AnswerSheet, compose_answer, question_title};
pub use extract::{ASK_TOOL_NAME, AskRequest, Question, QuestionOption, extract_ask_requests};
pub use sequencer::{AskQueueEntry, AskSequencer, message_key};
