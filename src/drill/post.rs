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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;

use crate::answer::Response;
use crate::drill::state::Feedback;
use crate::drill::state::MutableState;
use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::error::fail;
use crate::pool::build_pool;
use crate::session::Phase;
use crate::session::Session;
use crate::session::Step;
use crate::types::letter::Letter;
use crate::types::letter::LetterSet;
use crate::types::question::QuestionType;

#[derive(Debug, PartialEq)]
enum Action {
    Start,
    Submit,
    Next,
    End,
    Restart,
}

impl Action {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "Start" => Some(Action::Start),
            "Submit" => Some(Action::Submit),
            "Next" => Some(Action::Next),
            "End" => Some(Action::End),
            "New Quiz" => Some(Action::Restart),
            _ => None,
        }
    }
}

/// The fields of a submitted form. Checkboxes and drag-and-drop slots repeat
/// their name, so the form is read as a list of pairs.
#[derive(Debug, PartialEq)]
struct FormData {
    action: Action,
    count: Option<String>,
    /// The number of the question the form was rendered for.
    number: Option<String>,
    reset_mastered: bool,
    reset_missed: bool,
    choices: Vec<String>,
    slots: Vec<String>,
}

impl FormData {
    fn from_pairs(pairs: Vec<(String, String)>) -> Fallible<Self> {
        let mut action = None;
        let mut count = None;
        let mut number = None;
        let mut reset_mastered = false;
        let mut reset_missed = false;
        let mut choices = Vec::new();
        let mut slots = Vec::new();
        for (key, value) in pairs {
            match key.as_str() {
                "action" => action = Action::parse(&value),
                "count" => count = Some(value),
                "number" => number = Some(value),
                "reset_mastered" => reset_mastered = true,
                "reset_missed" => reset_missed = true,
                "choice" => choices.push(value),
                "slot" => slots.push(value),
                _ => log::debug!("Ignoring form field {key}."),
            }
        }
        let Some(action) = action else {
            return fail("form has no valid action.");
        };
        Ok(Self {
            action,
            count,
            number,
            reset_mastered,
            reset_missed,
            choices,
            slots,
        })
    }
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    match FormData::from_pairs(pairs).and_then(|form| action_handler(&state, form)) {
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
        }
    }
    Redirect::to("/")
}

fn action_handler(state: &ServerState, form: FormData) -> Fallible<()> {
    let mut guard = state.mutable.lock().unwrap();
    let mutable: &mut MutableState = &mut guard;
    let in_progress = mutable
        .session
        .as_ref()
        .is_some_and(|s| s.phase() == Phase::InProgress);
    match form.action {
        Action::Start => {
            if in_progress {
                return fail("a quiz is already in progress.");
            }
            let count = match form.count.as_deref().map(str::trim).map(str::parse::<usize>) {
                Some(Ok(count)) => count,
                _ => {
                    mutable.notice = Some("Please enter a valid number.".to_string());
                    mutable.session = None;
                    return Ok(());
                }
            };
            if form.reset_mastered {
                mutable.memory.reset_mastered()?;
            }
            if form.reset_missed {
                mutable.memory.reset_missed()?;
            }
            let queue = build_pool(&state.bank, &mutable.memory, count, &mut rand::rng());
            let mut session = Session::new(queue);
            let step = session.start(&mut mutable.memory)?;
            mutable.summary = match step {
                Step::Ended(record) => Some(record),
                Step::Next => None,
            };
            mutable.session = Some(session);
            mutable.feedback = None;
            mutable.notice = None;
        }
        Action::Submit => {
            if mutable.feedback.is_some() {
                return fail("the last answer has not been acknowledged.");
            }
            let Some(session) = mutable.session.as_mut() else {
                return fail("no quiz is in progress.");
            };
            let Some(item) = session.current() else {
                return fail("no question is being asked.");
            };
            let number = session.presented() + 1;
            if let Some(submitted) = &form.number {
                if submitted.trim().parse::<usize>() != Ok(number) {
                    return fail(format!(
                        "answer is for question {submitted}, but question {number} is being asked."
                    ));
                }
            }
            let kind = item.question.kind;
            let explanation = item.question.explanation.clone();
            let response = match kind {
                QuestionType::MultipleChoice => {
                    let option_count = item.question.options.len();
                    let selected: LetterSet = form
                        .choices
                        .iter()
                        .filter_map(|c| Letter::parse(c, option_count))
                        .collect();
                    Response::Choice(selected)
                }
                QuestionType::DragAndDrop => Response::Sequence(form.slots),
            };
            let (verdict, step) = session.submit(&response, &mut mutable.memory)?;
            if let Step::Ended(record) = step {
                mutable.summary = Some(record);
            }
            mutable.feedback = Some(Feedback {
                number,
                kind,
                verdict,
                explanation,
            });
        }
        Action::Next => {
            mutable.feedback = None;
        }
        Action::End => {
            if let Some(session) = mutable.session.as_mut() {
                if session.phase() != Phase::Ended {
                    let record = session.end(&mut mutable.memory)?;
                    mutable.summary = Some(record);
                }
            }
            mutable.feedback = None;
        }
        Action::Restart => {
            if in_progress {
                return fail("a quiz is in progress; end it first.");
            }
            mutable.session = None;
            mutable.summary = None;
            mutable.feedback = None;
        }
    }
    Ok(())
}
