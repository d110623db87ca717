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

use std::sync::Arc;
use std::sync::Mutex;

use crate::answer::Verdict;
use crate::bank::Bank;
use crate::media::ImageLoader;
use crate::memory::Memory;
use crate::session::Session;
use crate::types::question::QuestionType;
use crate::types::score::ScoreRecord;

#[derive(Clone)]
pub struct ServerState {
    pub bank: Arc<Bank>,
    pub images: ImageLoader,
    /// The question count offered on the start screen.
    pub default_count: usize,
    pub dark: bool,
    pub mutable: Arc<Mutex<MutableState>>,
}

pub struct MutableState {
    pub memory: Memory,
    /// `None` until the user starts a quiz.
    pub session: Option<Session>,
    /// The verdict on the last answer, shown until the user moves on.
    pub feedback: Option<Feedback>,
    /// The score of the session, once it has ended.
    pub summary: Option<ScoreRecord>,
    /// A message for the start screen, e.g. an invalid question count.
    pub notice: Option<String>,
}

pub struct Feedback {
    /// The 1-based number of the question that was answered.
    pub number: usize,
    pub kind: QuestionType,
    pub verdict: Verdict,
    pub explanation: Option<String>,
}
