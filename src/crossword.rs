use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use smallvec::SmallVec;

use crate::{VariableId, Vocabulary, MAX_SLOT_LENGTH};

/// Zero-indexed row and column of a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// A pair of character indices `(ix, iy)` at which variables `x` and `y` must agree.
pub type Overlap = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// An immutable slot descriptor. Two variables are the same slot iff every field matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable { row, col, direction, length }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        })
    }
}

/// A crossing between one variable and another, referencing the other variable's id, the cell
/// index within this variable and the matching cell index within the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_variable_id: VariableId,
    pub cell: usize,
    pub other_cell: usize,
}

/// Ways a problem instance can be malformed. These are reported when the crossword is built, so
/// propagation and search never index outside a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrosswordError {
    ZeroLength(Variable),
    DuplicateVariable(Variable),
    UnknownVariable(Variable),
    SelfOverlap(Variable),
    OverlapOutOfRange { variable: Variable, index: usize },
    ContradictoryOverlap(Variable, Variable),
    MultipleOverlaps(Variable, Variable),
}

impl Display for CrosswordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CrosswordError::ZeroLength(variable) => {
                write!(f, "variable {:?} has zero length", variable)
            }
            CrosswordError::DuplicateVariable(variable) => {
                write!(f, "variable {:?} appears more than once", variable)
            }
            CrosswordError::UnknownVariable(variable) => {
                write!(f, "overlap references unknown variable {:?}", variable)
            }
            CrosswordError::SelfOverlap(variable) => {
                write!(f, "variable {:?} cannot overlap itself", variable)
            }
            CrosswordError::OverlapOutOfRange { variable, index } => {
                write!(f, "overlap index {} is outside variable {:?}", index, variable)
            }
            CrosswordError::ContradictoryOverlap(x, y) => {
                write!(f, "contradictory overlaps given for {:?} and {:?}", x, y)
            }
            CrosswordError::MultipleOverlaps(x, y) => {
                write!(f, "variables {:?} and {:?} share more than one cell", x, y)
            }
        }
    }
}

impl Error for CrosswordError {}

/// A problem instance: the slots to fill, how they cross, and the vocabulary to fill them from.
/// This is static for the lifetime of a solve.
pub struct Crossword {
    variables: Vec<Variable>,
    ids_by_variable: HashMap<Variable, VariableId>,
    crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>>,
    vocabulary: Vocabulary,
}

impl Debug for Crossword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crossword")
            .field("variables", &self.variables)
            .field("crossings", &self.crossings)
            .field("vocabulary", &(["(", &self.vocabulary.len().to_string(), " words)"].join("")))
            .finish()
    }
}

impl Crossword {
    /// Build a crossword whose overlaps are derived from the grid geometry: any two variables
    /// covering the same cell overlap at their respective indices of that cell.
    pub fn new(variables: Vec<Variable>, vocabulary: Vocabulary) -> Result<Crossword, CrosswordError> {
        let mut crossword = Crossword::empty(variables, vocabulary)?;

        // Build a map from cell location to the variables covering it, which we can then use to
        // calculate crossings.
        let mut entries_by_cell: HashMap<GridCoord, Vec<(VariableId, usize)>> = HashMap::new();
        for (variable_id, variable) in crossword.variables.iter().enumerate() {
            for (cell_idx, loc) in variable.cells().enumerate() {
                entries_by_cell.entry(loc).or_default().push((variable_id, cell_idx));
            }
        }

        let mut cells: Vec<_> = entries_by_cell.into_iter().filter(|(_, entries)| entries.len() > 1).collect();
        cells.sort_unstable_by_key(|(loc, _)| *loc);

        for (_, entries) in cells {
            for (i, &(x, ix)) in entries.iter().enumerate() {
                for &(y, iy) in &entries[i + 1..] {
                    if crossword.overlap(x, y).is_some() {
                        return Err(CrosswordError::MultipleOverlaps(
                            crossword.variables[x],
                            crossword.variables[y],
                        ));
                    }
                    crossword.add_overlap(x, y, (ix, iy))?;
                }
            }
        }

        Ok(crossword)
    }

    /// Build a crossword from an externally computed overlap table. Each entry only needs to be
    /// given in one orientation; `None` entries are accepted and mean "no shared cell".
    pub fn with_overlaps<I>(
        variables: Vec<Variable>,
        vocabulary: Vocabulary,
        overlaps: I,
    ) -> Result<Crossword, CrosswordError>
    where
        I: IntoIterator<Item = ((Variable, Variable), Option<Overlap>)>,
    {
        let mut crossword = Crossword::empty(variables, vocabulary)?;

        for ((x, y), overlap) in overlaps {
            let x_id = crossword.variable_id(&x).ok_or(CrosswordError::UnknownVariable(x))?;
            let y_id = crossword.variable_id(&y).ok_or(CrosswordError::UnknownVariable(y))?;

            match (overlap, crossword.overlap(x_id, y_id)) {
                (None, None) => {}
                (Some(overlap), None) => crossword.add_overlap(x_id, y_id, overlap)?,
                (Some(overlap), Some(existing)) if overlap == existing => {}
                _ => return Err(CrosswordError::ContradictoryOverlap(x, y)),
            }
        }

        Ok(crossword)
    }

    /// Build a crossword from a matrix of open (`true`) and blocked (`false`) cells. Every
    /// maximal run of two or more open cells down a column or across a row becomes a variable.
    /// Ragged rows are treated as blocked past their end.
    pub fn from_structure(structure: &[Vec<bool>], vocabulary: Vocabulary) -> Result<Crossword, CrosswordError> {
        let is_open = |row: usize, col: usize| {
            structure.get(row).and_then(|line| line.get(col)).copied().unwrap_or(false)
        };

        let mut variables: Vec<Variable> = vec![];

        for (row, line) in structure.iter().enumerate() {
            for col in 0..line.len() {
                if !is_open(row, col) {
                    continue;
                }

                if row == 0 || !is_open(row - 1, col) {
                    let length = (row..).take_while(|&r| is_open(r, col)).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Down, length));
                    }
                }

                if col == 0 || !is_open(row, col - 1) {
                    let length = (col..).take_while(|&c| is_open(row, c)).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Across, length));
                    }
                }
            }
        }

        Crossword::new(variables, vocabulary)
    }

    fn empty(variables: Vec<Variable>, vocabulary: Vocabulary) -> Result<Crossword, CrosswordError> {
        let mut ids_by_variable = HashMap::with_capacity(variables.len());

        for (variable_id, &variable) in variables.iter().enumerate() {
            if variable.length == 0 {
                return Err(CrosswordError::ZeroLength(variable));
            }
            if ids_by_variable.insert(variable, variable_id).is_some() {
                return Err(CrosswordError::DuplicateVariable(variable));
            }
        }

        Ok(Crossword {
            crossings: variables.iter().map(|_| SmallVec::new()).collect(),
            variables,
            ids_by_variable,
            vocabulary,
        })
    }

    /// Record a crossing in both directions.
    fn add_overlap(&mut self, x: VariableId, y: VariableId, (ix, iy): Overlap) -> Result<(), CrosswordError> {
        if x == y {
            return Err(CrosswordError::SelfOverlap(self.variables[x]));
        }
        for (variable_id, index) in [(x, ix), (y, iy)] {
            let variable = self.variables[variable_id];
            if index >= variable.length {
                return Err(CrosswordError::OverlapOutOfRange { variable, index });
            }
        }

        self.crossings[x].push(Crossing { other_variable_id: y, cell: ix, other_cell: iy });
        self.crossings[y].push(Crossing { other_variable_id: x, cell: iy, other_cell: ix });

        Ok(())
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, variable_id: VariableId) -> &Variable {
        &self.variables[variable_id]
    }

    pub fn variable_id(&self, variable: &Variable) -> Option<VariableId> {
        self.ids_by_variable.get(variable).copied()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn crossings(&self, variable_id: VariableId) -> &[Crossing] {
        &self.crossings[variable_id]
    }

    /// The character indices at which `x` and `y` intersect, as `(index in x, index in y)`.
    pub fn overlap(&self, x: VariableId, y: VariableId) -> Option<Overlap> {
        self.crossings[x]
            .iter()
            .find(|crossing| crossing.other_variable_id == y)
            .map(|crossing| (crossing.cell, crossing.other_cell))
    }

    pub fn neighbors(&self, variable_id: VariableId) -> impl Iterator<Item = VariableId> + '_ {
        self.crossings[variable_id].iter().map(|crossing| crossing.other_variable_id)
    }

    /// Number of neighbors, used as the degree tie-break when ordering variables.
    pub fn degree(&self, variable_id: VariableId) -> usize {
        self.crossings[variable_id].len()
    }

    /// Every ordered pair of overlapping variables.
    pub fn arcs(&self) -> Vec<(VariableId, VariableId)> {
        self.crossings
            .iter()
            .enumerate()
            .flat_map(|(x, crossings)| crossings.iter().map(move |crossing| (x, crossing.other_variable_id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::Direction::{Across, Down};
    use crate::{Crossword, CrosswordError, Variable, Vocabulary};

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(["CAT", "DOG"])
    }

    /// `_` marks an open cell, anything else is blocked.
    fn structure(template: &str) -> Vec<Vec<bool>> {
        template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| c == '_').collect())
            .collect()
    }

    #[test]
    fn test_cells_follow_direction() {
        let across: Vec<_> = Variable::new(1, 2, Across, 3).cells().collect();
        let down: Vec<_> = Variable::new(1, 2, Down, 3).cells().collect();

        assert_eq!(across, vec![(1, 2), (1, 3), (1, 4)]);
        assert_eq!(down, vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_overlaps_derived_from_geometry_are_symmetric() {
        let across = Variable::new(0, 0, Across, 3);
        let down = Variable::new(0, 2, Down, 3);
        let apart = Variable::new(4, 0, Across, 3);
        let crossword = Crossword::new(vec![across, down, apart], vocabulary()).unwrap();

        assert_eq!(crossword.overlap(0, 1), Some((2, 0)));
        assert_eq!(crossword.overlap(1, 0), Some((0, 2)));
        assert_eq!(crossword.overlap(0, 2), None);
        assert_eq!(crossword.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(crossword.degree(2), 0);

        let mut arcs = crossword.arcs();
        arcs.sort();
        assert_eq!(arcs, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_from_structure_finds_runs_longer_than_one() {
        let crossword = Crossword::from_structure(
            &structure(
                "
                #___#
                #_##_
                #____
                ",
            ),
            vocabulary(),
        )
        .unwrap();

        assert_eq!(
            crossword.variables(),
            &[
                Variable::new(0, 1, Down, 3),
                Variable::new(0, 1, Across, 3),
                Variable::new(1, 4, Down, 2),
                Variable::new(2, 1, Across, 4),
            ]
        );
        assert_eq!(crossword.overlap(0, 1), Some((0, 0)));
        assert_eq!(crossword.overlap(0, 3), Some((2, 0)));
        assert_eq!(crossword.overlap(2, 3), Some((1, 3)));
        assert_eq!(crossword.overlap(1, 2), None);
    }

    #[test]
    fn test_with_overlaps_mirrors_entries() {
        let x = Variable::new(0, 0, Across, 3);
        let y = Variable::new(5, 5, Down, 3);
        let crossword =
            Crossword::with_overlaps(vec![x, y], vocabulary(), [((x, y), Some((0, 2))), ((y, x), Some((2, 0)))])
                .unwrap();

        assert_eq!(crossword.overlap(0, 1), Some((0, 2)));
        assert_eq!(crossword.overlap(1, 0), Some((2, 0)));
        assert_eq!(crossword.crossings(0).len(), 1);
    }

    #[test]
    fn test_malformed_instances_are_rejected() {
        let x = Variable::new(0, 0, Across, 3);
        let y = Variable::new(0, 0, Down, 3);
        let ghost = Variable::new(9, 9, Down, 3);

        assert_eq!(
            Crossword::new(vec![Variable::new(0, 0, Across, 0)], vocabulary()).unwrap_err(),
            CrosswordError::ZeroLength(Variable::new(0, 0, Across, 0))
        );
        assert_eq!(Crossword::new(vec![x, x], vocabulary()).unwrap_err(), CrosswordError::DuplicateVariable(x));
        assert_eq!(
            Crossword::with_overlaps(vec![x, y], vocabulary(), [((x, ghost), Some((0, 0)))]).unwrap_err(),
            CrosswordError::UnknownVariable(ghost)
        );
        assert_eq!(
            Crossword::with_overlaps(vec![x, y], vocabulary(), [((x, x), Some((0, 0)))]).unwrap_err(),
            CrosswordError::SelfOverlap(x)
        );
        assert_eq!(
            Crossword::with_overlaps(vec![x, y], vocabulary(), [((x, y), Some((0, 3)))]).unwrap_err(),
            CrosswordError::OverlapOutOfRange { variable: y, index: 3 }
        );
        assert_eq!(
            Crossword::with_overlaps(vec![x, y], vocabulary(), [((x, y), Some((0, 0))), ((y, x), Some((1, 1)))])
                .unwrap_err(),
            CrosswordError::ContradictoryOverlap(y, x)
        );

        let stacked = Variable::new(0, 1, Across, 3);
        assert_eq!(
            Crossword::new(vec![x, stacked], vocabulary()).unwrap_err(),
            CrosswordError::MultipleOverlaps(x, stacked)
        );
    }
}
