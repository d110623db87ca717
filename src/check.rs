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

use std::path::Path;
use std::process::ExitCode;

use serde_json::Value;

use crate::answer::normalize;
use crate::bank::read_bank_json;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::letter::letters_for;
use crate::types::question::AnswerField;
use crate::types::question::json_to_text;

/// The result of checking a question bank.
#[derive(Debug, PartialEq)]
pub struct Validation {
    /// The number of question records seen.
    pub total: usize,
    pub issues: Vec<String>,
}

/// Check the question bank at `path` and print a report. Returns a failing
/// exit code if any issue was found.
pub fn check_bank(path: &Path) -> Fallible<ExitCode> {
    let value = read_bank_json(path)?;
    let validation = validate_bank(&value)?;
    if validation.issues.is_empty() {
        println!("Validation OK: {} questions.", validation.total);
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "Validation FAILED: {} issues found in {} questions:\n",
            validation.issues.len(),
            validation.total
        );
        for (i, issue) in validation.issues.iter().enumerate() {
            println!("{:3}. {issue}", i + 1);
        }
        Ok(ExitCode::FAILURE)
    }
}

pub fn validate_bank(bank: &Value) -> Fallible<Validation> {
    let Value::Object(topics) = bank else {
        return fail("question bank must map topic names to lists of questions.");
    };
    let mut total = 0;
    let mut issues = Vec::new();
    for (topic, questions) in topics {
        let Value::Array(questions) = questions else {
            issues.push(format!("Topic '{topic}' is not a list of questions"));
            continue;
        };
        for (idx, question) in questions.iter().enumerate() {
            total += 1;
            validate_question(&format!("{topic}[{}]", idx + 1), question, &mut issues);
        }
    }
    Ok(Validation { total, issues })
}

fn validate_question(at: &str, question: &Value, issues: &mut Vec<String>) {
    let Value::Object(fields) = question else {
        issues.push(format!("{at} not an object"));
        return;
    };

    match fields.get("question") {
        Some(Value::String(text)) if !text.is_empty() => {}
        _ => issues.push(format!("{at} missing/invalid 'question'")),
    }

    let options: Vec<String> = match fields.get("options") {
        Some(Value::Array(options)) if !options.is_empty() => {
            options.iter().map(json_to_text).collect()
        }
        _ => {
            issues.push(format!("{at} missing/invalid 'options'"));
            return;
        }
    };

    let answer = fields.get("answer").and_then(AnswerField::from_json);
    match fields.get("type") {
        None => validate_choice(at, &options, answer.as_ref(), issues),
        Some(Value::String(kind)) if kind == "multiple_choice" => {
            validate_choice(at, &options, answer.as_ref(), issues)
        }
        Some(Value::String(kind)) if kind == "drag_and_drop" || kind == "ordered_selection" => {
            match fields.get("answer") {
                Some(Value::Array(items)) if !items.is_empty() => {}
                _ => issues.push(format!("{at} DnD 'answer' must be a non-empty list")),
            }
        }
        Some(kind) => issues.push(format!("{at} unknown type '{}'", json_to_text(kind))),
    }
}

fn validate_choice(at: &str, options: &[String], answer: Option<&AnswerField>, issues: &mut Vec<String>) {
    if normalize(options, answer).is_empty() {
        let hint: Vec<String> = letters_for(options.len().min(4))
            .map(|l| format!("'{l}'"))
            .collect();
        issues.push(format!(
            "{at} MC answer unparseable; consider using letters like [{}] or exact option text",
            hint.join(", ")
        ));
    }
}
