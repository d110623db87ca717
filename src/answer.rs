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

//! Answer normalization and matching.
//!
//! Stored answers are written by hand, so the same answer may appear as a
//! letter (`"B"`), a punctuated letter (`"B:"`), or the literal text of an
//! option (`"Bar"`). Everything is resolved to a set of option letters before
//! it is compared against what the user selected.

use std::collections::BTreeSet;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::letter::Letter;
use crate::types::letter::LetterSet;
use crate::types::question::AnswerField;
use crate::types::question::Question;
use crate::types::question::QuestionType;

/// Shown when the correct answer of a question cannot be determined.
pub const UNKNOWN: &str = "Unknown";

/// The outcome of comparing a response with the stored answer.
#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
    pub correct: bool,
    /// The correct answer, formatted for display.
    pub expected: String,
}

/// What the user submitted for a question.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// The ticked options of a multiple choice question.
    Choice(LetterSet),
    /// The options picked for each slot of a drag-and-drop question, in
    /// order.
    Sequence(Vec<String>),
}

/// Resolve a stored answer into the set of option letters it refers to.
///
/// Tokens that cannot be resolved are dropped, so an empty set means the
/// answer could not be understood.
pub fn normalize(options: &[String], answer: Option<&AnswerField>) -> LetterSet {
    match answer {
        Some(answer) => normalize_tokens(options, answer.items()),
        None => LetterSet::new(),
    }
}

fn normalize_tokens<'a>(options: &[String], tokens: impl IntoIterator<Item = &'a str>) -> LetterSet {
    let mut letters = LetterSet::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(letter) = resolve_token(options, token) {
            letters.insert(letter);
        }
    }
    letters
}

fn resolve_token(options: &[String], token: &str) -> Option<Letter> {
    let count = options.len();

    // Leading letter: "A", "A:", "a. Foo".
    if let Some(first) = token.chars().next() {
        let first: String = first.to_uppercase().collect();
        if let Some(letter) = Letter::parse(&first, count) {
            return Some(letter);
        }
    }

    // The literal text of an option. Later options win ties.
    if let Some(index) = options.iter().rposition(|option| option.trim() == token) {
        if let Some(letter) = Letter::from_index(index) {
            return Some(letter);
        }
    }

    // First word with trailing punctuation removed.
    let word = token.split_whitespace().next()?;
    let word = word.trim_end_matches(['.', ':']).to_uppercase();
    Letter::parse(&word, count)
}

/// Format a set of letters as `"A. Foo, C. Bar"`.
pub fn format_letters(options: &[String], letters: &LetterSet) -> String {
    if letters.is_empty() {
        return UNKNOWN.to_string();
    }
    letters
        .iter()
        .map(|letter| match options.get(letter.index()) {
            Some(option) => format!("{letter}. {option}"),
            None => letter.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compare the options ticked by the user with the stored answer of a
/// multiple choice question.
pub fn match_choice(options: &[String], correct: Option<&AnswerField>, selected: &LetterSet) -> Verdict {
    let letters = normalize(options, correct);
    if !letters.is_empty() {
        return Verdict {
            correct: *selected == letters,
            expected: format_letters(options, &letters),
        };
    }

    // The answer is neither letters nor option text. Compare the text of the
    // selected options with the raw answer instead.
    let raw: Vec<&str> = correct.map(AnswerField::items).unwrap_or_default();
    let mut distinct: Vec<&str> = Vec::new();
    for item in raw {
        if !distinct.contains(&item) {
            distinct.push(item);
        }
    }
    let correct_texts: BTreeSet<&str> = distinct.iter().copied().collect();
    let selected_texts: BTreeSet<&str> = selected
        .iter()
        .filter_map(|letter| options.get(letter.index()))
        .map(String::as_str)
        .collect();
    let expected = if distinct.iter().all(|item| item.trim().is_empty()) {
        UNKNOWN.to_string()
    } else {
        distinct.join(", ")
    };
    Verdict {
        correct: correct.is_some() && selected_texts == correct_texts,
        expected,
    }
}

/// Compare the options picked for each slot with the expected sequence.
/// Entries are compared whole: an entry may contain `|` or `,` and is never
/// split.
pub fn match_sequence(correct: Option<&AnswerField>, selected: &[String]) -> Verdict {
    let expected: Vec<&str> = correct.map(AnswerField::items).unwrap_or_default();
    let is_correct = expected.len() == selected.len()
        && expected
            .iter()
            .zip(selected.iter())
            .all(|(e, s)| *e == s.as_str());
    let expected = if expected.is_empty() {
        UNKNOWN.to_string()
    } else {
        expected.join(", ")
    };
    Verdict {
        correct: is_correct,
        expected,
    }
}

/// Grade a response to a question.
pub fn grade(question: &Question, response: &Response) -> Fallible<Verdict> {
    match (question.kind, response) {
        (QuestionType::MultipleChoice, Response::Choice(selected)) => Ok(match_choice(
            &question.options,
            question.answer.as_ref(),
            selected,
        )),
        (QuestionType::DragAndDrop, Response::Sequence(selected)) => {
            Ok(match_sequence(question.answer.as_ref(), selected))
        }
        _ => fail("response does not match the question type."),
    }
}
