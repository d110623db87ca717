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

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::types::question_hash::Hasher;
use crate::types::question_hash::QuestionHash;

/// The stored answer of a question: a single string, or a list of strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerField {
    One(String),
    Many(Vec<String>),
}

impl AnswerField {
    /// The answer as a list of raw tokens. A single string is a one-element
    /// list.
    pub fn items(&self) -> Vec<&str> {
        match self {
            AnswerField::One(s) => vec![s.as_str()],
            AnswerField::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }

    /// Read an answer out of untyped JSON. Non-string scalars are turned into
    /// their textual form; `null` is no answer at all.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(AnswerField::One(s.clone())),
            Value::Array(items) => Some(AnswerField::Many(
                items.iter().map(json_to_text).collect(),
            )),
            other => Some(AnswerField::One(other.to_string())),
        }
    }
}

/// Render a JSON value the way it reads as text: strings without quotes,
/// everything else as JSON.
pub fn json_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Tick every correct option.
    #[default]
    MultipleChoice,
    /// Put a fixed number of options in the right order.
    #[serde(alias = "ordered_selection")]
    DragAndDrop,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: Option<AnswerField>,
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Path to an image, relative to the question bank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Question {
    /// The identity of a question. Only the question text and the options
    /// take part, so editing the explanation or the image of a question does
    /// not make it a different question.
    pub fn hash(&self) -> QuestionHash {
        let mut hasher = Hasher::new();
        let text = self.question.trim();
        hasher.update(&text.len().to_le_bytes());
        hasher.update(text.as_bytes());
        hasher.update(&self.options.len().to_le_bytes());
        for option in &self.options {
            let option = option.trim();
            hasher.update(&option.len().to_le_bytes());
            hasher.update(option.as_bytes());
        }
        hasher.finalize()
    }

    /// The expected sequence of a drag-and-drop question.
    pub fn expected_sequence(&self) -> Vec<String> {
        match &self.answer {
            Some(answer) => answer.items().into_iter().map(str::to_string).collect(),
            None => Vec::new(),
        }
    }
}

/// A question together with the name of the topic it was loaded from.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizItem {
    pub topic: String,
    pub question: Question,
}
