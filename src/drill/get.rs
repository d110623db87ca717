// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::drill::state::Feedback;
use crate::drill::state::MutableState;
use crate::drill::state::ServerState;
use crate::drill::template::page_template;
use crate::markdown::markdown_to_html;
use crate::markdown::markdown_to_html_inline;
use crate::media::image_url;
use crate::session::Phase;
use crate::session::Session;
use crate::types::letter::letters_for;
use crate::types::question::QuestionType;
use crate::types::question::QuizItem;
use crate::types::score::ScoreRecord;

const TITLE: &str = "Certification Quiz";

/// Shown when a multiple choice question has no explanation.
const NO_EXPLANATION: &str = "No explanation available.";

/// The first entry of every drag-and-drop slot.
const SELECT_PLACEHOLDER: &str = "Select option";

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mutable = state.mutable.lock().unwrap();
    let body = match (&mutable.session, &mutable.feedback) {
        (None, _) => render_start(&state, &mutable),
        (Some(_), Some(feedback)) => render_feedback(feedback),
        (Some(session), None) => match (session.phase(), session.current(), &mutable.summary) {
            (Phase::InProgress, Some(item), _) => render_question(&state, session, item),
            (_, _, Some(summary)) => render_summary(summary, &mutable),
            _ => render_start(&state, &mutable),
        },
    };
    let html = page_template(TITLE, state.dark, body);
    (StatusCode::OK, Html(html.into_string()))
}

fn render_start(state: &ServerState, mutable: &MutableState) -> Markup {
    let bank = &state.bank;
    let counts = format!(
        "{} questions in {} topics. {} mastered, {} missed.",
        bank.question_count(),
        bank.topics().len(),
        mutable.memory.mastered().len(),
        mutable.memory.missed().len()
    );
    html! {
        div.root {
            div.card {
                div.header {
                    h1 { (TITLE) }
                }
                p.counts { (counts) }
                @if let Some(notice) = &mutable.notice {
                    p.notice { (notice) }
                }
                form action="/" method="post" {
                    label for="count" { "How many questions would you like to answer?" }
                    input id="count" type="text" name="count" value=(state.default_count);
                    label.option {
                        input type="checkbox" name="reset_mastered" value="on";
                        "Reset the previously asked questions"
                    }
                    label.option {
                        input type="checkbox" name="reset_missed" value="on";
                        "Reset the previously missed questions"
                    }
                    div.controls {
                        input id="start" type="submit" name="action" value="Start";
                    }
                }
            }
        }
    }
}

fn render_question(state: &ServerState, session: &Session, item: &QuizItem) -> Markup {
    let question = &item.question;
    let number = session.presented() + 1;
    let progress = format!("{} / {}", number, session.len());
    let image: Option<Markup> = question.image.as_deref().map(|path| {
        match state.images.validate(path) {
            Ok(_) => html! {
                div.image {
                    img src=(image_url(path)) alt="";
                }
            },
            Err(e) => {
                log::warn!("Failed to show image {path}: {e:?}");
                html! {
                    p.notice { (format!("(Could not load image: {path})")) }
                }
            }
        }
    });
    let inputs: Markup = match question.kind {
        QuestionType::MultipleChoice => html! {
            @for (letter, option) in letters_for(question.options.len()).zip(question.options.iter()) {
                label.option {
                    input type="checkbox" name="choice" value=(letter.to_string());
                    (letter.to_string()) ". " (PreEscaped(markdown_to_html_inline(option)))
                }
            }
        },
        QuestionType::DragAndDrop => html! {
            @for slot in 0..question.expected_sequence().len() {
                select name="slot" aria-label=(format!("Position {}", slot + 1)) {
                    option value="" { (SELECT_PLACEHOLDER) }
                    @for option in &question.options {
                        option value=(option) { (option) }
                    }
                }
            }
        },
    };
    html! {
        div.root {
            div.card {
                div.header {
                    h1 { (format!("Question {number}")) }
                    div.progress { (progress) }
                }
                div.topic { (item.topic) }
                @if let Some(image) = image {
                    (image)
                }
                div.question .rich-text {
                    (PreEscaped(markdown_to_html(&question.question)))
                }
                form action="/" method="post" {
                    input type="hidden" name="number" value=(number);
                    div.options {
                        (inputs)
                    }
                    div.controls {
                        input id="submit" type="submit" name="action" value="Submit";
                        div.spacer {}
                        input id="end" type="submit" name="action" value="End";
                    }
                }
            }
        }
    }
}

fn render_feedback(feedback: &Feedback) -> Markup {
    let verdict = &feedback.verdict;
    let message = if verdict.correct {
        "Correct!".to_string()
    } else {
        match feedback.kind {
            QuestionType::MultipleChoice => format!("Wrong! Correct answer: {}", verdict.expected),
            QuestionType::DragAndDrop => format!("Wrong! Correct sequence: {}", verdict.expected),
        }
    };
    let explanation: Option<&str> = match (&feedback.explanation, feedback.kind) {
        (Some(text), _) if !text.trim().is_empty() => Some(text),
        (_, QuestionType::MultipleChoice) => Some(NO_EXPLANATION),
        _ => None,
    };
    html! {
        div.root {
            div.card {
                div.header {
                    h1 { (format!("Question {}", feedback.number)) }
                }
                div.result.correct[verdict.correct].wrong[!verdict.correct] {
                    p { (message) }
                }
                @if let Some(explanation) = explanation {
                    div.explanation .rich-text {
                        h2 { "Explanation" }
                        (PreEscaped(markdown_to_html(explanation)))
                    }
                }
                form action="/" method="post" {
                    div.controls {
                        input id="next" type="submit" name="action" value="Next";
                    }
                }
            }
        }
    }
}

fn render_summary(summary: &ScoreRecord, mutable: &MutableState) -> Markup {
    let score = format!(
        "Score: {}/{} ({:.2}%)",
        summary.correct, summary.total, summary.score
    );
    let history = mutable.memory.history();
    html! {
        div.root {
            div.card {
                div.header {
                    h1 { "Quiz Ended" }
                }
                p.score { (score) }
                @if summary.passed() {
                    div.banner.pass { "Passed. Well done!" }
                } @else {
                    div.banner.fail { "Not there yet. Try harder!" }
                }
                @if !history.is_empty() {
                    h2 { "Score History" }
                    ul.history {
                        @for record in history {
                            li { (record.to_string()) }
                        }
                    }
                }
                form action="/" method="post" {
                    div.controls {
                        input id="restart" type="submit" name="action" value="New Quiz";
                    }
                }
            }
        }
    }
}
