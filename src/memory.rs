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

//! Progress kept between sessions: the mastered questions, the missed
//! questions, and the score history. Each lives in its own JSON file which is
//! read whole and replaced whole on every change.

use std::collections::HashSet;
use std::fs::File;
use std::fs::create_dir_all;
use std::fs::remove_file;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::Fallible;
use crate::types::question::Question;
use crate::types::question_hash::QuestionHash;
use crate::types::score::ScoreRecord;

pub const MASTERED_FILE: &str = "asked_questions.json";
pub const MISSED_FILE: &str = "wrong_questions.json";
pub const HISTORY_FILE: &str = "score_history.json";

pub struct Memory {
    directory: PathBuf,
    /// Questions answered correctly. Never asked again unless reset.
    mastered: Vec<Question>,
    /// Questions answered incorrectly. Asked first in the next session.
    missed: Vec<Question>,
    history: Vec<ScoreRecord>,
}

impl Memory {
    /// Load the state files from `directory`. Missing files are empty.
    pub fn load(directory: PathBuf) -> Fallible<Self> {
        let mastered = read_list(&directory.join(MASTERED_FILE))?;
        let missed = read_list(&directory.join(MISSED_FILE))?;
        let history = read_list(&directory.join(HISTORY_FILE))?;
        log::debug!(
            "Loaded {} mastered, {} missed, {} past sessions.",
            mastered.len(),
            missed.len(),
            history.len()
        );
        Ok(Self {
            directory,
            mastered,
            missed,
            history,
        })
    }

    pub fn mastered(&self) -> &[Question] {
        &self.mastered
    }

    pub fn missed(&self) -> &[Question] {
        &self.missed
    }

    pub fn history(&self) -> &[ScoreRecord] {
        &self.history
    }

    pub fn mastered_hashes(&self) -> HashSet<QuestionHash> {
        self.mastered.iter().map(Question::hash).collect()
    }

    /// Record a correct answer: the question is mastered and no longer
    /// missed.
    pub fn mark_correct(&mut self, question: &Question) -> Fallible<()> {
        let hash = question.hash();
        if !contains(&self.mastered, hash) {
            self.mastered.push(question.clone());
            self.save_mastered()?;
        }
        if contains(&self.missed, hash) {
            self.missed.retain(|q| q.hash() != hash);
            self.save_missed()?;
        }
        Ok(())
    }

    /// Record a wrong answer: the question is missed and no longer mastered.
    pub fn mark_missed(&mut self, question: &Question) -> Fallible<()> {
        let hash = question.hash();
        if !contains(&self.missed, hash) {
            self.missed.push(question.clone());
            self.save_missed()?;
        }
        if contains(&self.mastered, hash) {
            self.mastered.retain(|q| q.hash() != hash);
            self.save_mastered()?;
        }
        Ok(())
    }

    pub fn record_score(&mut self, record: ScoreRecord) -> Fallible<()> {
        self.history.push(record);
        write_list(&self.directory.join(HISTORY_FILE), &self.history)
    }

    /// Forget which questions were mastered.
    pub fn reset_mastered(&mut self) -> Fallible<()> {
        log::debug!("Resetting mastered questions.");
        self.mastered.clear();
        delete(&self.directory.join(MASTERED_FILE))
    }

    /// Forget which questions were missed.
    pub fn reset_missed(&mut self) -> Fallible<()> {
        log::debug!("Resetting missed questions.");
        self.missed.clear();
        delete(&self.directory.join(MISSED_FILE))
    }

    fn save_mastered(&self) -> Fallible<()> {
        write_list(&self.directory.join(MASTERED_FILE), &self.mastered)
    }

    fn save_missed(&self) -> Fallible<()> {
        write_list(&self.directory.join(MISSED_FILE), &self.missed)
    }
}

fn contains(questions: &[Question], hash: QuestionHash) -> bool {
    questions.iter().any(|q| q.hash() == hash)
}

/// Read a JSON list. A file that does not exist is an empty list. Entries
/// that don't parse are skipped with a warning.
pub fn read_list<T: DeserializeOwned>(path: &Path) -> Fallible<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let entries: Vec<Value> = serde_json::from_reader(reader)?;
    let mut items = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<T>(entry) {
            Ok(item) => items.push(item),
            Err(e) => log::warn!("Skipping {}[{}]: {e}", path.display(), idx + 1),
        }
    }
    Ok(items)
}

/// Replace a JSON list. The new content is written to a temporary file next to
/// the target and renamed over it, so readers never see a partial file.
fn write_list<T: Serialize>(path: &Path, items: &[T]) -> Fallible<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_dir_all(parent)?;
    let temp_file = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, items)?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    Ok(())
}

fn delete(path: &Path) -> Fallible<()> {
    if path.exists() {
        remove_file(path)?;
    }
    Ok(())
}
