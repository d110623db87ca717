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

use std::env::current_dir;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::question::Question;
use crate::types::question::QuizItem;

/// Environment variable naming the question bank.
pub const BANK_ENV_VAR: &str = "SC200_JSON";

/// The file name searched for when no bank is given.
const BANK_FILE_NAME: &str = "sc-200.json";

/// Places tried, in order, before searching the whole tree.
const BANK_CANDIDATES: [&str; 3] = ["questions/sc-200.json", "sc-200.json", "data/sc-200.json"];

/// Exit status when no question bank can be found.
pub const MISSING_BANK_EXIT_CODE: u8 = 2;

pub struct Topic {
    pub name: String,
    pub questions: Vec<Question>,
}

/// The questions of a bank file, grouped by topic in file order.
pub struct Bank {
    /// The directory the bank was loaded from. Image paths are relative to it.
    directory: PathBuf,
    topics: Vec<Topic>,
}

impl Bank {
    pub fn load(path: &Path) -> Fallible<Self> {
        log::debug!("Loading question bank...");
        let start = Instant::now();
        let value = read_bank_json(path)?;
        let topics = parse_topics(value)?;
        let duration = Instant::now().duration_since(start).as_millis();
        log::debug!("Question bank loaded in {duration}ms.");
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => current_dir()?,
        };
        Ok(Self {
            directory: directory.canonicalize()?,
            topics,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Every question, topic by topic.
    pub fn items(&self) -> Vec<QuizItem> {
        self.topics
            .iter()
            .flat_map(|topic| {
                topic.questions.iter().map(|question| QuizItem {
                    topic: topic.name.clone(),
                    question: question.clone(),
                })
            })
            .collect()
    }

    pub fn question_count(&self) -> usize {
        self.topics.iter().map(|t| t.questions.len()).sum()
    }
}

/// Read the bank file as untyped JSON. A missing file is fatal.
pub fn read_bank_json(path: &Path) -> Fallible<Value> {
    if !path.exists() {
        return Err(
            ErrorReport::new(format!("question file {} does not exist.", path.display()))
                .with_exit_code(MISSING_BANK_EXIT_CODE),
        );
    }
    let content = read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Turn the bank JSON into topics. Records that are not well-formed questions
/// are skipped with a warning; `--validate` reports them in detail.
fn parse_topics(value: Value) -> Fallible<Vec<Topic>> {
    let Value::Object(map) = value else {
        return fail("question bank must map topic names to lists of questions.");
    };
    let mut topics = Vec::new();
    for (name, entries) in map {
        let Value::Array(entries) = entries else {
            log::warn!("Skipping topic '{name}': not a list of questions.");
            continue;
        };
        let mut questions = Vec::new();
        for (idx, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Question>(entry) {
                Ok(question) => questions.push(question),
                Err(e) => log::warn!("Skipping {name}[{}]: {e}", idx + 1),
            }
        }
        topics.push(Topic { name, questions });
    }
    Ok(topics)
}

/// Find the question bank when no path was given on the command line.
pub fn find_default_bank() -> Fallible<PathBuf> {
    let env = std::env::var(BANK_ENV_VAR).ok();
    match find_bank_in(&current_dir()?, env) {
        Some(path) => Ok(path),
        None => Err(ErrorReport::new(format!(
            "Could not find a questions JSON. Pass --file or set {BANK_ENV_VAR}."
        ))
        .with_exit_code(MISSING_BANK_EXIT_CODE)),
    }
}

fn find_bank_in(directory: &Path, env: Option<String>) -> Option<PathBuf> {
    let explicit = env.filter(|p| !p.is_empty()).map(PathBuf::from);
    let candidates = explicit
        .into_iter()
        .chain(BANK_CANDIDATES.iter().map(|c| directory.join(c)));
    for candidate in candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }
    WalkDir::new(directory)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == BANK_FILE_NAME)
        .map(|entry| entry.into_path())
}
