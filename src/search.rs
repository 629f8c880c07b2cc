use std::cmp::Reverse;

use instant::{Duration, Instant};
use log::{debug, info, trace};

use crate::arc_consistency::CrossingArc;
use crate::domains::Checkpoint;
use crate::{
    assignment_complete, consistent_with, enforce_arc_consistency, enforce_node_consistency, Assignment, Choice,
    Crossword, Domains, VariableId, WordId,
};

/// What search does to the domains after each tentative assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inference {
    /// Plain backtracking: domains are only narrowed before search starts.
    #[default]
    None,

    /// Narrow the assigned variable's domain to its word and rerun AC-3 from its neighbors,
    /// abandoning the word if any domain empties.
    MaintainArcConsistency,
}

/// Settings for a solve.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    pub inference: Inference,

    /// Give up after this many tentative assignments. `None` searches to exhaustion.
    pub max_states: Option<u64>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub revisions: u64,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Why no fill was produced. Every variant except `StateLimitReached` means the crossword has
/// no solution with its vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// Node consistency left this variable without any word of the right length.
    EmptyDomain { variable_id: VariableId },
    /// The initial AC-3 pass emptied a domain.
    ArcInconsistent,
    /// Backtracking tried every candidate without finding a complete assignment.
    Exhausted,
    StateLimitReached,
}

/// Pick the unassigned variable with the fewest remaining words, breaking ties by the highest
/// number of neighbors and then by the lowest id. Returns `None` if everything is assigned.
pub fn select_unassigned_variable(
    crossword: &Crossword,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<VariableId> {
    (0..crossword.variables().len())
        .filter(|&variable_id| !assignment.is_assigned(variable_id))
        .min_by_key(|&variable_id| (domains.len(variable_id), Reverse(crossword.degree(variable_id))))
}

/// The words in `variable_id`'s domain, ordered by how many neighboring domains also contain
/// that word, fewest first. Equal counts keep vocabulary order.
pub fn order_domain_values(crossword: &Crossword, domains: &Domains, variable_id: VariableId) -> Vec<WordId> {
    let mut words: Vec<WordId> = domains.iter(variable_id).collect();

    words.sort_by_cached_key(|&word_id| {
        crossword.neighbors(variable_id).filter(|&neighbor| domains.contains(neighbor, word_id)).count()
    });

    words
}

/// One level of the explicit search stack.
#[derive(Debug)]
struct Frame {
    variable_id: VariableId,
    candidates: Vec<WordId>,
    next_candidate: usize,

    /// Set while a candidate is tentatively assigned; rolling back to it undoes any inference.
    checkpoint: Option<Checkpoint>,
}

/// Tentatively commit `choice`, applying inference if configured. On failure the assignment
/// and domains are left exactly as they were and `None` is returned.
fn try_choice(
    crossword: &Crossword,
    domains: &mut Domains,
    assignment: &mut Assignment,
    choice: Choice,
    config: &SolverConfig,
    statistics: &mut Statistics,
) -> Option<Checkpoint> {
    if !consistent_with(crossword, assignment, &choice) {
        return None;
    }

    let checkpoint = domains.checkpoint();
    assignment.insert(choice.variable_id, choice.word_id);

    if config.inference == Inference::MaintainArcConsistency {
        domains.restrict(choice.variable_id, choice.word_id);

        let arcs: Vec<CrossingArc> =
            crossword.neighbors(choice.variable_id).map(|neighbor| (neighbor, choice.variable_id)).collect();
        let (arc_consistent, revisions) = enforce_arc_consistency(crossword, domains, Some(arcs.as_slice()));
        statistics.revisions += revisions;

        if !arc_consistent {
            assignment.remove(choice.variable_id);
            domains.rollback(checkpoint);
            return None;
        }
    }

    Some(checkpoint)
}

/// Depth-first backtracking over `domains`, using an explicit stack rather than recursion.
/// The first complete, consistent assignment found wins.
fn backtrack(
    crossword: &Crossword,
    domains: &mut Domains,
    config: &SolverConfig,
    statistics: &mut Statistics,
) -> Result<Assignment, FillFailure> {
    let mut assignment = Assignment::new(crossword.variables().len());
    let mut frames: Vec<Frame> = Vec::with_capacity(crossword.variables().len());

    'variable_selection: loop {
        if assignment_complete(crossword, &assignment) {
            return Ok(assignment);
        }

        if let Some(variable_id) = select_unassigned_variable(crossword, domains, &assignment) {
            frames.push(Frame {
                variable_id,
                candidates: order_domain_values(crossword, domains, variable_id),
                next_candidate: 0,
                checkpoint: None,
            });
        }

        // Advance the top frame to its next workable candidate, popping exhausted frames.
        while let Some(frame) = frames.last_mut() {
            if let Some(checkpoint) = frame.checkpoint.take() {
                assignment.remove(frame.variable_id);
                domains.rollback(checkpoint);
                statistics.backtracks += 1;
                trace!("backtracking {:?}", crossword.variable(frame.variable_id));
            }

            while let Some(&word_id) = frame.candidates.get(frame.next_candidate) {
                frame.next_candidate += 1;

                if config.max_states.map(|limit| statistics.states >= limit).unwrap_or(false) {
                    return Err(FillFailure::StateLimitReached);
                }

                let choice = Choice { variable_id: frame.variable_id, word_id };
                if let Some(checkpoint) = try_choice(crossword, domains, &mut assignment, choice, config, statistics) {
                    statistics.states += 1;
                    trace!(
                        "trying {:?} = {:?}",
                        crossword.variable(frame.variable_id),
                        crossword.vocabulary().word(word_id),
                    );
                    frame.checkpoint = Some(checkpoint);
                    continue 'variable_selection;
                }
            }

            frames.pop();
        }

        return Err(FillFailure::Exhausted);
    }
}

/// Search for a fill: node consistency, then a global AC-3 pass, then backtracking search.
pub fn find_fill(crossword: &Crossword, config: &SolverConfig) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = Domains::new(crossword);
    enforce_node_consistency(crossword, &mut domains);

    if let Some(variable_id) = domains.first_empty() {
        info!("no words fit {:?}", crossword.variable(variable_id));
        return Err(FillFailure::EmptyDomain { variable_id });
    }

    let (arc_consistent, revisions) = enforce_arc_consistency(crossword, &mut domains, None);
    statistics.revisions += revisions;
    if !arc_consistent {
        info!("arc consistency emptied a domain after {} revisions", revisions);
        return Err(FillFailure::ArcInconsistent);
    }
    domains.commit();

    debug!(
        "searching {} variables, {} candidates remaining after propagation",
        crossword.variables().len(),
        (0..crossword.variables().len()).map(|variable_id| domains.len(variable_id)).sum::<usize>(),
    );

    let result = backtrack(crossword, &mut domains, config, &mut statistics);
    statistics.duration = start.elapsed();

    match result {
        Ok(assignment) => {
            info!("found a fill: {:?}", statistics);
            Ok(FillSuccess { statistics, assignment })
        }
        Err(failure) => {
            info!("no fill ({:?}): {:?}", failure, statistics);
            Err(failure)
        }
    }
}

/// Solve with the default configuration, returning `None` when no solution exists.
pub fn solve(crossword: &Crossword) -> Option<Assignment> {
    find_fill(crossword, &SolverConfig::default()).ok().map(|success| success.assignment)
}
