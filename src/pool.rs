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

use std::collections::HashMap;
use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::Bank;
use crate::memory::Memory;
use crate::types::question::QuizItem;
use crate::types::question_hash::QuestionHash;

/// Choose the questions for a session.
///
/// Previously missed questions that are still in the bank come first, in the
/// order they were missed. The rest of the bank follows in random order,
/// leaving out mastered questions. At most `count` questions are returned.
pub fn build_pool<R: Rng + ?Sized>(
    bank: &Bank,
    memory: &Memory,
    count: usize,
    rng: &mut R,
) -> Vec<QuizItem> {
    let items: Vec<QuizItem> = bank.items();
    let mut by_hash: HashMap<QuestionHash, usize> = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        by_hash.entry(item.question.hash()).or_insert(idx);
    }

    // The bank's copy is used, so later edits to a question show up.
    let mut seen: HashSet<QuestionHash> = HashSet::new();
    let mut queue: Vec<QuizItem> = Vec::new();
    for question in memory.missed() {
        let hash = question.hash();
        if let Some(&idx) = by_hash.get(&hash) {
            if seen.insert(hash) {
                queue.push(items[idx].clone());
            }
        }
    }
    let missed_count = queue.len();

    let mastered: HashSet<QuestionHash> = memory.mastered_hashes();
    let mut remainder: Vec<QuizItem> = items
        .into_iter()
        .filter(|item| {
            let hash = item.question.hash();
            !mastered.contains(&hash) && seen.insert(hash)
        })
        .collect();
    remainder.shuffle(rng);
    let fresh_count = remainder.len();

    queue.extend(remainder);
    queue.truncate(count);
    log::debug!(
        "Pool: {missed_count} missed, {fresh_count} fresh, {} selected.",
        queue.len()
    );
    queue
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;
    use crate::error::Fallible;
    use crate::helper::create_tmp_directory;
    use crate::helper::write_bank;
    use crate::types::question::Question;

    fn q(text: &str) -> serde_json::Value {
        json!({"question": text, "options": ["Foo", "Bar", "Baz"], "answer": "A"})
    }

    fn setup() -> Fallible<(Bank, Memory)> {
        let dir = create_tmp_directory()?;
        let path = write_bank(
            &dir,
            &json!({
                "One": [q("Q1"), q("Q2")],
                "Two": [q("Q3"), q("Q4")]
            }),
        )?;
        let bank = Bank::load(&path)?;
        let memory = Memory::load(dir.join("state"))?;
        Ok((bank, memory))
    }

    fn find(bank: &Bank, text: &str) -> Question {
        bank.items()
            .into_iter()
            .find(|i| i.question.question == text)
            .map(|i| i.question)
            .unwrap()
    }

    fn texts(queue: &[QuizItem]) -> Vec<&str> {
        queue.iter().map(|i| i.question.question.as_str()).collect()
    }

    #[test]
    fn test_missed_first_mastered_never() -> Fallible<()> {
        let (bank, mut memory) = setup()?;
        memory.mark_missed(&find(&bank, "Q2"))?;
        memory.mark_correct(&find(&bank, "Q4"))?;
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let queue = build_pool(&bank, &memory, 3, &mut rng);
            let texts = texts(&queue);
            assert_eq!(texts.len(), 3);
            assert_eq!(texts[0], "Q2");
            let rest: HashSet<&str> = texts[1..].iter().copied().collect();
            assert_eq!(rest, HashSet::from(["Q1", "Q3"]));
        }
        Ok(())
    }

    #[test]
    fn test_count_larger_than_available() -> Fallible<()> {
        let (bank, mut memory) = setup()?;
        memory.mark_correct(&find(&bank, "Q1"))?;
        let mut rng = StdRng::seed_from_u64(7);
        let queue = build_pool(&bank, &memory, 100, &mut rng);
        let set: HashSet<&str> = texts(&queue).into_iter().collect();
        assert_eq!(set, HashSet::from(["Q2", "Q3", "Q4"]));
        assert_eq!(queue.len(), 3);
        Ok(())
    }

    #[test]
    fn test_count_zero() -> Fallible<()> {
        let (bank, memory) = setup()?;
        let queue = build_pool(&bank, &memory, 0, &mut rand::rng());
        assert!(queue.is_empty());
        Ok(())
    }

    #[test]
    fn test_stale_missed_dropped() -> Fallible<()> {
        let (bank, mut memory) = setup()?;
        let mut gone = find(&bank, "Q1");
        gone.question = "Removed from the bank".to_string();
        memory.mark_missed(&gone)?;
        memory.mark_missed(&find(&bank, "Q3"))?;
        let queue = build_pool(&bank, &memory, 4, &mut rand::rng());
        let texts = texts(&queue);
        assert_eq!(texts[0], "Q3");
        assert_eq!(texts.len(), 4);
        assert!(!texts.contains(&"Removed from the bank"));
        Ok(())
    }

    #[test]
    fn test_missed_keeps_stored_order_and_bank_copy() -> Fallible<()> {
        let (bank, mut memory) = setup()?;
        memory.mark_missed(&find(&bank, "Q4"))?;
        let mut stale = find(&bank, "Q1");
        stale.explanation = Some("Old explanation".to_string());
        memory.mark_missed(&stale)?;
        let queue = build_pool(&bank, &memory, 2, &mut rand::rng());
        assert_eq!(texts(&queue), vec!["Q4", "Q1"]);
        assert_eq!(queue[1].question.explanation, None);
        assert_eq!(queue[0].topic, "Two");
        Ok(())
    }

    #[test]
    fn test_everything_mastered() -> Fallible<()> {
        let (bank, mut memory) = setup()?;
        for item in bank.items() {
            memory.mark_correct(&item.question)?;
        }
        let queue = build_pool(&bank, &memory, 5, &mut rand::rng());
        assert!(queue.is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicates_collapse() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = write_bank(&dir, &json!({"One": [q("Q1"), q("Q1")], "Two": [q("Q1")]}))?;
        let bank = Bank::load(&path)?;
        let memory = Memory::load(dir)?;
        let queue = build_pool(&bank, &memory, 5, &mut rand::rng());
        assert_eq!(queue.len(), 1);
        Ok(())
    }
}
