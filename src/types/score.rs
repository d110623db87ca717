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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// The lowest score, in percent, that counts as a pass.
pub const PASS_THRESHOLD: f64 = 79.0;

/// One finished session in the score history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub date: Timestamp,
    pub correct: usize,
    pub total: usize,
    pub score: f64,
}

impl ScoreRecord {
    pub fn new(date: Timestamp, correct: usize, total: usize) -> Self {
        Self {
            date,
            correct,
            total,
            score: score_percent(correct, total),
        }
    }

    pub fn passed(&self) -> bool {
        self.score >= PASS_THRESHOLD
    }
}

impl Display for ScoreRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}/{} ({:.2}%)",
            self.date, self.correct, self.total, self.score
        )
    }
}

/// The percentage of correct answers. An empty session scores zero.
pub fn score_percent(correct: usize, presented: usize) -> f64 {
    correct as f64 / presented.max(1) as f64 * 100.0
}
