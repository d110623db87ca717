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

use std::fs::write;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use tempfile::Builder;

use crate::error::Fallible;
use crate::types::question::AnswerField;
use crate::types::question::Question;
use crate::types::question::QuestionType;
use crate::types::question::QuizItem;

/// Create a temporary directory that outlives the test.
pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let dir = Builder::new().prefix("certquiz").tempdir()?;
    Ok(dir.keep())
}

/// Write a question bank into `directory` and return its path.
pub fn write_bank(directory: &Path, bank: &Value) -> Fallible<PathBuf> {
    let path = directory.join("questions.json");
    write(&path, serde_json::to_string_pretty(bank)?)?;
    Ok(path)
}

/// A multiple choice question whose answer is the first option.
pub fn make_question(text: &str) -> Question {
    Question {
        question: text.to_string(),
        options: vec!["Foo".to_string(), "Bar".to_string(), "Baz".to_string()],
        answer: Some(AnswerField::One("A".to_string())),
        kind: QuestionType::MultipleChoice,
        explanation: None,
        image: None,
    }
}

pub fn make_item(text: &str) -> QuizItem {
    QuizItem {
        topic: "Topic".to_string(),
        question: make_question(text),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_tmp_directory() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        assert!(dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_write_bank() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = write_bank(&dir, &json!({"Topic": []}))?;
        assert!(path.is_file());
        Ok(())
    }
}
