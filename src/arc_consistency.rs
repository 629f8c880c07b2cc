use std::collections::VecDeque;

use bit_set::BitSet;
use log::trace;

use crate::{Crossword, Domains, VariableId, WordId};

/// An ordered pair `(x, y)`: revising it makes `x` consistent with `y`.
pub type CrossingArc = (VariableId, VariableId);

/// FIFO work queue of arcs. An arc that is already waiting isn't enqueued a second time.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<CrossingArc>,
    pending: BitSet,
    variable_count: usize,
}

impl ArcQueue {
    fn new(variable_count: usize) -> ArcQueue {
        ArcQueue {
            queue: VecDeque::new(),
            pending: BitSet::with_capacity(variable_count * variable_count),
            variable_count,
        }
    }

    fn with_initial_queue<Arcs>(variable_count: usize, arcs: Arcs) -> ArcQueue
    where
        Arcs: IntoIterator<Item = CrossingArc>,
    {
        let mut queue = ArcQueue::new(variable_count);
        for arc in arcs {
            queue.enqueue(arc);
        }
        queue
    }

    fn enqueue(&mut self, (x, y): CrossingArc) {
        if self.pending.insert(x * self.variable_count + y) {
            self.queue.push_back((x, y));
        }
    }

    fn pop_front(&mut self) -> Option<CrossingArc> {
        let (x, y) = self.queue.pop_front()?;
        self.pending.remove(x * self.variable_count + y);
        Some((x, y))
    }
}

/// Make `x` arc-consistent with `y` by removing every word in `x`'s domain that has no word in
/// `y`'s domain agreeing at their overlap. Returns whether `x`'s domain changed. Pairs with no
/// overlap are trivially consistent.
pub fn revise(crossword: &Crossword, domains: &mut Domains, x: VariableId, y: VariableId) -> bool {
    let (ix, iy) = match crossword.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };
    let vocabulary = crossword.vocabulary();

    let unsupported: Vec<WordId> = domains
        .iter(x)
        .filter(|&x_word| {
            let glyph = vocabulary.word(x_word).chars[ix];
            !domains.iter(y).any(|y_word| vocabulary.word(y_word).chars[iy] == glyph)
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    !unsupported.is_empty()
}

/// AC-3. Starting from `arcs` (or every arc in the crossword if `None`), revise arcs until the
/// queue drains. Whenever `x` shrinks, every arc `(z, x)` is requeued. Returns false as soon as
/// any domain is emptied, meaning the problem has no solution under the current domains.
///
/// The returned count is the number of revisions that removed something.
pub fn enforce_arc_consistency(
    crossword: &Crossword,
    domains: &mut Domains,
    arcs: Option<&[CrossingArc]>,
) -> (bool, u64) {
    let variable_count = crossword.variables().len();
    let mut queue = match arcs {
        Some(arcs) => ArcQueue::with_initial_queue(variable_count, arcs.iter().copied()),
        None => ArcQueue::with_initial_queue(variable_count, crossword.arcs()),
    };
    let mut revisions: u64 = 0;

    while let Some((x, y)) = queue.pop_front() {
        if !revise(crossword, domains, x, y) {
            continue;
        }
        revisions += 1;

        trace!("revised {:?} against {:?}, {} left", crossword.variable(x), crossword.variable(y), domains.len(x));

        if domains.is_empty(x) {
            return (false, revisions);
        }

        for z in crossword.neighbors(x) {
            queue.enqueue((z, x));
        }
    }

    (true, revisions)
}
