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

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;

/// The largest number of options that can be addressed by a letter.
pub const MAX_LETTERS: usize = 26;

/// An option letter: `A` addresses the first option, `B` the second, and so
/// on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Letter(u8);

/// A set of option letters, iterated in ascending order.
pub type LetterSet = BTreeSet<Letter>;

impl Letter {
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_LETTERS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Parse a string consisting of exactly one uppercase letter, which must
    /// address one of `option_count` options.
    pub fn parse(s: &str, option_count: usize) -> Option<Self> {
        let mut chars = s.chars();
        let c = chars.next()?;
        if chars.next().is_some() || !c.is_ascii_uppercase() {
            return None;
        }
        let index = (c as u8 - b'A') as usize;
        if index < option_count {
            Self::from_index(index)
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn as_char(self) -> char {
        (b'A' + self.0) as char
    }
}

impl Display for Letter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The letters for `option_count` options, in order.
pub fn letters_for(option_count: usize) -> impl Iterator<Item = Letter> {
    (0..option_count.min(MAX_LETTERS)).filter_map(Letter::from_index)
}
