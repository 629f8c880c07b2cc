use bit_set::BitSet;
use log::debug;

use crate::{Crossword, VariableId, WordId};

/// A position in the undo trail, returned by `Domains::checkpoint`.
pub type Checkpoint = usize;

/// The live candidate words for each variable. Domains only ever shrink, and every removal is
/// recorded on a trail so that search can roll back to an exact earlier state.
#[derive(Debug, Clone)]
pub struct Domains {
    sets: Vec<BitSet>,

    /// Cached `sets[i].len()`, since `BitSet::len` walks the whole set.
    sizes: Vec<usize>,

    trail: Vec<(VariableId, WordId)>,
}

impl Domains {
    /// Seed every variable's domain with the full vocabulary.
    pub fn new(crossword: &Crossword) -> Domains {
        let word_count = crossword.vocabulary().len();
        let full: BitSet = (0..word_count).collect();

        Domains {
            sets: crossword.variables().iter().map(|_| full.clone()).collect(),
            sizes: crossword.variables().iter().map(|_| word_count).collect(),
            trail: vec![],
        }
    }

    pub fn len(&self, variable_id: VariableId) -> usize {
        self.sizes[variable_id]
    }

    pub fn is_empty(&self, variable_id: VariableId) -> bool {
        self.sizes[variable_id] == 0
    }

    pub fn contains(&self, variable_id: VariableId, word_id: WordId) -> bool {
        self.sets[variable_id].contains(word_id)
    }

    /// Words in the domain, in vocabulary order.
    pub fn iter(&self, variable_id: VariableId) -> impl Iterator<Item = WordId> + '_ {
        self.sets[variable_id].iter()
    }

    /// The first variable whose domain is empty, if any.
    pub fn first_empty(&self) -> Option<VariableId> {
        self.sizes.iter().position(|&size| size == 0)
    }

    /// Remove a word from a domain, returning whether it was present.
    pub fn remove(&mut self, variable_id: VariableId, word_id: WordId) -> bool {
        if !self.sets[variable_id].remove(word_id) {
            return false;
        }
        self.sizes[variable_id] -= 1;
        self.trail.push((variable_id, word_id));
        true
    }

    /// Narrow a domain down to the single given word.
    pub fn restrict(&mut self, variable_id: VariableId, word_id: WordId) {
        let others: Vec<WordId> = self.sets[variable_id].iter().filter(|&other| other != word_id).collect();
        for other in others {
            self.remove(variable_id, other);
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.trail.len()
    }

    /// Restore every word removed since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint {
            if let Some((variable_id, word_id)) = self.trail.pop() {
                self.sets[variable_id].insert(word_id);
                self.sizes[variable_id] += 1;
            }
        }
    }

    /// Forget the trail, making every removal so far permanent.
    pub fn commit(&mut self) {
        self.trail.clear();
    }
}

/// Remove every word whose length differs from its variable's length. This is purely unary; an
/// emptied domain is left for the caller to detect.
pub fn enforce_node_consistency(crossword: &Crossword, domains: &mut Domains) {
    let vocabulary = crossword.vocabulary();

    for (variable_id, variable) in crossword.variables().iter().enumerate() {
        let wrong_length: Vec<WordId> = domains
            .iter(variable_id)
            .filter(|&word_id| vocabulary.word(word_id).len() != variable.length)
            .collect();

        for word_id in wrong_length {
            domains.remove(variable_id, word_id);
        }

        debug!("{:?} has {} candidates after node consistency", variable, domains.len(variable_id));
    }
}

#[cfg(test)]
mod tests {
    use crate::Direction::{Across, Down};
    use crate::{enforce_node_consistency, Crossword, Domains, Variable, Vocabulary};

    fn crossword() -> Crossword {
        Crossword::new(
            vec![Variable::new(0, 0, Across, 3), Variable::new(0, 0, Down, 2)],
            Vocabulary::new(["CAT", "DOG", "AB", "EMUS"]),
        )
        .unwrap()
    }

    #[test]
    fn test_domains_start_with_full_vocabulary() {
        let crossword = crossword();
        let domains = Domains::new(&crossword);

        assert_eq!(domains.len(0), 4);
        assert_eq!(domains.iter(1).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(domains.first_empty(), None);
    }

    #[test]
    fn test_node_consistency_keeps_only_matching_lengths() {
        let crossword = crossword();
        let mut domains = Domains::new(&crossword);

        enforce_node_consistency(&crossword, &mut domains);

        for (variable_id, variable) in crossword.variables().iter().enumerate() {
            assert!(domains.len(variable_id) > 0);
            for word_id in domains.iter(variable_id) {
                assert_eq!(crossword.vocabulary().word(word_id).len(), variable.length);
            }
        }
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(domains.iter(1).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_node_consistency_is_idempotent() {
        let crossword = crossword();
        let mut once = Domains::new(&crossword);
        enforce_node_consistency(&crossword, &mut once);

        let mut twice = once.clone();
        enforce_node_consistency(&crossword, &mut twice);

        for variable_id in 0..crossword.variables().len() {
            assert_eq!(once.iter(variable_id).collect::<Vec<_>>(), twice.iter(variable_id).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_node_consistency_can_empty_a_domain() {
        let crossword =
            Crossword::new(vec![Variable::new(0, 0, Across, 5)], Vocabulary::new(["CAT", "DOG"])).unwrap();
        let mut domains = Domains::new(&crossword);

        enforce_node_consistency(&crossword, &mut domains);

        assert!(domains.is_empty(0));
        assert_eq!(domains.first_empty(), Some(0));
    }

    #[test]
    fn test_rollback_restores_exact_state() {
        let crossword = crossword();
        let mut domains = Domains::new(&crossword);
        domains.remove(0, 3);
        domains.commit();

        let checkpoint = domains.checkpoint();
        domains.restrict(0, 1);
        assert!(!domains.remove(0, 0));
        domains.remove(1, 2);
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(domains.len(1), 3);

        domains.rollback(checkpoint);

        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(domains.len(0), 3);
        assert_eq!(domains.len(1), 4);
    }
}
