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

use serde::Serialize;

use crate::error::Fallible;
use crate::memory::Memory;
use crate::types::score::ScoreRecord;

/// Print the score history in `state_dir` as JSON.
pub fn print_history(state_dir: &Path) -> Fallible<()> {
    let memory = Memory::load(state_dir.to_path_buf())?;
    let history = History::new(memory.history());
    let json = serde_json::to_string_pretty(&history)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct History<'a> {
    session_count: usize,
    passed_count: usize,
    average_score: f64,
    sessions: &'a [ScoreRecord],
}

impl<'a> History<'a> {
    pub fn new(sessions: &'a [ScoreRecord]) -> Self {
        let passed_count = sessions.iter().filter(|r| r.passed()).count();
        let average_score = if sessions.is_empty() {
            0.0
        } else {
            sessions.iter().map(|r| r.score).sum::<f64>() / sessions.len() as f64
        };
        Self {
            session_count: sessions.len(),
            passed_count,
            average_score,
            sessions,
        }
    }
}
