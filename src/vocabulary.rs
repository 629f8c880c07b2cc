use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::{WordId, MAX_SLOT_LENGTH};

/// A candidate word, with its characters split out so that overlap checks can index by character.
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let chars = string.chars().collect();
        Word { string, chars }
    }

    /// Length in characters, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.string)
    }
}

/// The full set of words every domain is seeded with. Duplicates collapse onto the first
/// occurrence, so `WordId`s follow first-seen order.
#[derive(Debug, Default)]
pub struct Vocabulary {
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,
}

impl Vocabulary {
    pub fn new<I, S>(words: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Vocabulary::default();
        for word in words {
            vocabulary.push(word.into());
        }
        vocabulary
    }

    /// Read a newline-separated word list. Lines are trimmed and upper-cased; blank lines are
    /// skipped.
    pub fn from_word_list(text: &str) -> Vocabulary {
        Vocabulary::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_uppercase),
        )
    }

    fn push(&mut self, string: String) {
        if string.is_empty() || self.ids_by_string.contains_key(&string) {
            return;
        }
        self.ids_by_string.insert(string.clone(), self.words.len());
        self.words.push(Word::new(string));
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn word_id(&self, string: &str) -> Option<WordId> {
        self.ids_by_string.get(string).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &Word)> {
        self.words.iter().enumerate()
    }
}
