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

use crate::answer::Response;
use crate::answer::Verdict;
use crate::answer::grade;
use crate::error::Fallible;
use crate::error::fail;
use crate::memory::Memory;
use crate::types::question::QuizItem;
use crate::types::score::ScoreRecord;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The queue is built but nothing has been shown.
    Ready,
    /// The question at `index` is being asked.
    InProgress,
    /// The score has been recorded. A new session needs a new pool.
    Ended,
}

/// What happened after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// There is another question to ask.
    Next,
    /// The session is over and its score was recorded.
    Ended(ScoreRecord),
}

/// One pass through a queue of questions.
pub struct Session {
    queue: Vec<QuizItem>,
    index: usize,
    correct: usize,
    phase: Phase,
}

impl Session {
    pub fn new(queue: Vec<QuizItem>) -> Self {
        Self {
            queue,
            index: 0,
            correct: 0,
            phase: Phase::Ready,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The number of questions in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// The number of answers submitted so far.
    pub fn presented(&self) -> usize {
        self.index
    }

    /// The question being asked, if any.
    pub fn current(&self) -> Option<&QuizItem> {
        match self.phase {
            Phase::InProgress => self.queue.get(self.index),
            _ => None,
        }
    }

    /// Show the first question. An empty queue ends the session at once.
    pub fn start(&mut self, memory: &mut Memory) -> Fallible<Step> {
        if self.phase != Phase::Ready {
            return fail("session has already started.");
        }
        if self.queue.is_empty() {
            log::debug!("No questions to ask.");
            return self.finish(memory).map(Step::Ended);
        }
        self.phase = Phase::InProgress;
        Ok(Step::Next)
    }

    /// Grade a response to the current question, update the mastered and
    /// missed sets, and move on.
    pub fn submit(&mut self, response: &Response, memory: &mut Memory) -> Fallible<(Verdict, Step)> {
        let Some(item) = self.current() else {
            return fail("no question is being asked.");
        };
        let question = item.question.clone();
        let verdict = grade(&question, response)?;
        log::debug!(
            "{} {} ({}/{})",
            question.hash().short(),
            if verdict.correct { "correct" } else { "wrong" },
            self.index + 1,
            self.queue.len()
        );
        if verdict.correct {
            self.correct += 1;
            memory.mark_correct(&question)?;
        } else {
            memory.mark_missed(&question)?;
        }
        self.index += 1;
        let step = if self.index < self.queue.len() {
            Step::Next
        } else {
            Step::Ended(self.finish(memory)?)
        };
        Ok((verdict, step))
    }

    /// Stop before the queue runs out. Only submitted answers count.
    pub fn end(&mut self, memory: &mut Memory) -> Fallible<ScoreRecord> {
        if self.phase == Phase::Ended {
            return fail("session has already ended.");
        }
        self.finish(memory)
    }

    fn finish(&mut self, memory: &mut Memory) -> Fallible<ScoreRecord> {
        self.phase = Phase::Ended;
        // A session with no answers is scored out of one question.
        let total = self.index.max(1);
        let record = ScoreRecord::new(Timestamp::now(), self.correct, total);
        log::debug!(
            "Session completed: {}/{} ({:.2}%)",
            record.correct,
            record.total,
            record.score
        );
        memory.record_score(record.clone())?;
        Ok(record)
    }
}
