use std::collections::HashSet;

use crate::{Crossword, Variable, VariableId, WordId};

/// A single variable assignment made during search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub variable_id: VariableId,
    pub word_id: WordId,
}

/// A partial mapping from variables to words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a crossword with `variable_count` variables.
    pub fn new(variable_count: usize) -> Assignment {
        Assignment { words: vec![None; variable_count], assigned_count: 0 }
    }

    pub fn get(&self, variable_id: VariableId) -> Option<WordId> {
        self.words[variable_id]
    }

    pub fn is_assigned(&self, variable_id: VariableId) -> bool {
        self.words[variable_id].is_some()
    }

    /// Assign a word, returning the word previously assigned to the variable if there was one.
    pub fn insert(&mut self, variable_id: VariableId, word_id: WordId) -> Option<WordId> {
        let previous = self.words[variable_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    pub fn remove(&mut self, variable_id: VariableId) -> Option<WordId> {
        let previous = self.words[variable_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.words.iter().enumerate().filter_map(|(variable_id, word_id)| {
            word_id.map(|word_id| Choice { variable_id, word_id })
        })
    }

    /// The word assigned to `variable`, if any.
    pub fn word<'a>(&self, crossword: &'a Crossword, variable: &Variable) -> Option<&'a str> {
        let word_id = self.get(crossword.variable_id(variable)?)?;
        Some(crossword.vocabulary().word(word_id).string.as_str())
    }

    /// Every assigned variable with its word, in variable order.
    pub fn to_words<'a>(&self, crossword: &'a Crossword) -> Vec<(Variable, &'a str)> {
        self.iter()
            .map(|Choice { variable_id, word_id }| {
                (*crossword.variable(variable_id), crossword.vocabulary().word(word_id).string.as_str())
            })
            .collect()
    }
}

/// True iff every variable in the crossword has a word.
pub fn assignment_complete(crossword: &Crossword, assignment: &Assignment) -> bool {
    (0..crossword.variables().len()).all(|variable_id| assignment.is_assigned(variable_id))
}

/// True iff the assigned words fit their variables' lengths, are pairwise distinct, and agree
/// at every overlap between two assigned variables.
pub fn consistent(crossword: &Crossword, assignment: &Assignment) -> bool {
    let vocabulary = crossword.vocabulary();
    let mut seen: HashSet<WordId> = HashSet::with_capacity(assignment.len());

    for Choice { variable_id, word_id } in assignment.iter() {
        let word = vocabulary.word(word_id);

        if word.len() != crossword.variable(variable_id).length || !seen.insert(word_id) {
            return false;
        }

        for crossing in crossword.crossings(variable_id) {
            if let Some(other_word_id) = assignment.get(crossing.other_variable_id) {
                if word.chars[crossing.cell] != vocabulary.word(other_word_id).chars[crossing.other_cell] {
                    return false;
                }
            }
        }
    }

    true
}

/// Would `assignment` stay consistent if `choice` were added to it? Assumes `assignment` is
/// already consistent and that the choice's variable is unassigned, so only the new word needs
/// checking.
pub fn consistent_with(crossword: &Crossword, assignment: &Assignment, choice: &Choice) -> bool {
    let vocabulary = crossword.vocabulary();
    let word = vocabulary.word(choice.word_id);

    if word.len() != crossword.variable(choice.variable_id).length {
        return false;
    }

    if assignment.iter().any(|other| other.word_id == choice.word_id) {
        return false;
    }

    crossword.crossings(choice.variable_id).iter().all(|crossing| {
        match assignment.get(crossing.other_variable_id) {
            Some(other_word_id) => {
                word.chars[crossing.cell] == vocabulary.word(other_word_id).chars[crossing.other_cell]
            }
            None => true,
        }
    })
}
