use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use crate::{Clause, Environment, Formula, Lit, Var};

// With reference to:
// * http://poincare.matf.bg.ac.rs/~filip/phd/sat-tutorial.pdf
//   (Formalization and Implementation of Modern SAT Solvers --Filip Marić)
// * https://en.wikipedia.org/wiki/DPLL_algorithm

// Plain DPLL: unit propagation by rescanning every clause, lowest-id
// true-first decisions and chronological backtracking. No learning.

/// Result of a single `Solver::propagate` call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Propagation {
    /// A unit clause forced this literal onto the trail.
    Implied(Lit),
    /// No clause is unit or falsified under the current trail.
    NoUnit,
    /// The clause at this index is false under the current trail.
    Conflict(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Decided(Lit),
    /// The pending pool is empty.
    Exhausted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backtrack {
    /// The most recent true decision was retried as false.
    Flipped(Lit),
    /// Every decision has been tried both ways.
    Exhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Satisfiable(Model),
    Unsatisfiable,
}

impl Outcome {
    pub fn is_sat(&self) -> bool {
        match *self {
            Outcome::Satisfiable(_) => true,
            Outcome::Unsatisfiable => false,
        }
    }

    pub fn model(&self) -> Option<&Model> {
        match *self {
            Outcome::Satisfiable(ref model) => Some(model),
            Outcome::Unsatisfiable => None,
        }
    }
}

/// A complete assignment, kept in the order the literals were assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    lits: Vec<Lit>,
    values: Vec<bool>,
}

impl Model {
    fn from_trail(trail: &[Lit]) -> Model {
        let mut values = vec![false; trail.len()];
        for lit in trail {
            values[lit.var.index()] = lit.val;
        }
        Model { lits: trail.to_vec(), values }
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<Var, bool> {
        self.lits.iter().map(|lit| (lit.var, lit.val)).collect()
    }

    pub fn satisfies(&self, formula: &Formula) -> bool {
        formula.eval(self) == Some(true)
    }
}

impl Environment for Model {
    fn value(&self, var: Var) -> Option<bool> {
        self.values.get(var.index()).cloned()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for lit in self.lits.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", lit)?;
            first = false;
        }
        Ok(())
    }
}

/// Search counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub decisions: u64,
    pub implied: u64,
    pub conflicts: u64,
    pub backtracks: u64,
}

/// Per-variable assignment marker, which also remembers the assigned value.
#[derive(Clone, Debug)]
struct Markers(Vec<Option<bool>>);

impl Markers {
    fn is_assigned(&self, var: Var) -> bool {
        self.0[var.index()].is_some()
    }

    fn set(&mut self, lit: Lit) {
        let slot = &mut self.0[lit.var.index()];
        debug_assert!(slot.is_none(), "{} assigned twice", lit.var);
        *slot = Some(lit.val);
    }

    fn clear(&mut self, lit: Lit) {
        let slot = &mut self.0[lit.var.index()];
        debug_assert_eq!(*slot, Some(lit.val), "marker out of sync for {}", lit.var);
        *slot = None;
    }
}

impl Environment for Markers {
    fn value(&self, var: Var) -> Option<bool> {
        self.0[var.index()]
    }
}

enum Status {
    Unit(Lit),
    Falsified,
    Open,
}

/// The search state for one formula. Meant to be solved once.
#[derive(Clone, Debug)]
pub struct Solver<'f> {
    formula: &'f Formula,
    trail: Vec<Lit>,
    decisions: Vec<Lit>,
    pending: BTreeSet<Var>,
    markers: Markers,
    stats: Stats,
}

/// Decides `formula` with a fresh solver.
pub fn solve(formula: &Formula) -> Outcome {
    Solver::new(formula).solve()
}

impl<'f> Solver<'f> {
    pub fn new(formula: &'f Formula) -> Self {
        let num_vars = formula.num_vars();
        Solver {
            formula,
            trail: Vec::with_capacity(num_vars),
            decisions: Vec::new(),
            pending: (1..=num_vars).map(Var::new).collect(),
            markers: Markers(vec![None; num_vars]),
            stats: Stats::default(),
        }
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    pub fn decisions(&self) -> &[Lit] {
        &self.decisions
    }

    /// Unassigned variables, lowest id first.
    pub fn pending(&self) -> impl Iterator<Item = Var> + '_ {
        self.pending.iter().cloned()
    }

    pub fn value(&self, var: Var) -> Option<bool> {
        self.markers.value(var)
    }

    pub fn level(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.trail.len() == self.formula.num_vars()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn solve(&mut self) -> Outcome {
        debug!("-> solve: {} variables, {} clauses",
               self.formula.num_vars(),
               self.formula.clauses().len());
        loop {
            if let Some(outcome) = self.step() {
                info!("<- solve: {} after {:?}",
                      if outcome.is_sat() { "SAT" } else { "UNSAT" },
                      self.stats);
                return outcome;
            }
        }
    }

    /// One round of the search loop: propagate until nothing more is
    /// implied, then either backtrack on a conflict or make a decision.
    /// Returns the outcome once the search is over.
    pub fn step(&mut self) -> Option<Outcome> {
        let conflict = loop {
            match self.propagate() {
                Propagation::Implied(_) => continue,
                Propagation::NoUnit => break false,
                Propagation::Conflict(_) => break true,
            }
        };

        if conflict {
            if self.decisions.is_empty() {
                debug!("Conflict without decisions; unsatisfiable");
                return Some(Outcome::Unsatisfiable);
            }
            return match self.backtrack() {
                Backtrack::Flipped(_) => None,
                Backtrack::Exhausted => Some(Outcome::Unsatisfiable),
            };
        }

        // Only reached at a conflict-free fixpoint, so a full trail has been
        // checked against every clause.
        if self.is_complete() {
            return Some(Outcome::Satisfiable(Model::from_trail(&self.trail)));
        }

        match self.decide() {
            Decision::Decided(_) => None,
            Decision::Exhausted => Some(Outcome::Unsatisfiable),
        }
    }

    /// Scans the formula for the first clause that is unit or false under
    /// the trail. At most one literal is implied per call.
    pub fn propagate(&mut self) -> Propagation {
        let formula = self.formula;
        for (idx, clause) in formula.clauses().iter().enumerate() {
            match self.status(clause) {
                Status::Unit(lit) => {
                    trace!("Implied {} by {}", lit, clause);
                    let pooled = self.pending.remove(&lit.var);
                    debug_assert!(pooled, "{} implied but not pending", lit.var);
                    self.assign(lit);
                    self.stats.implied += 1;
                    return Propagation::Implied(lit);
                }
                Status::Falsified => {
                    debug!("Conflict on clause #{}: {}", idx, clause);
                    self.stats.conflicts += 1;
                    return Propagation::Conflict(idx);
                }
                Status::Open => {}
            }
        }
        Propagation::NoUnit
    }

    fn status(&self, clause: &Clause) -> Status {
        if clause.is_unit() {
            let lit = clause.lits()[0];
            return match lit.eval(&self.markers) {
                None => Status::Unit(lit),
                Some(false) => Status::Falsified,
                Some(true) => Status::Open,
            };
        }

        let mut free = clause.lits().iter().filter(|lit| !self.markers.is_assigned(lit.var));
        match (free.next(), free.next()) {
            (Some(&lit), None) => {
                if clause.eval(&self.markers) == Some(true) {
                    Status::Open
                } else {
                    Status::Unit(lit)
                }
            }
            (None, _) => {
                if clause.eval(&self.markers) == Some(false) {
                    Status::Falsified
                } else {
                    Status::Open
                }
            }
            _ => Status::Open,
        }
    }

    /// Assigns the lowest pending variable to true.
    pub fn decide(&mut self) -> Decision {
        let var = match self.pending.pop_first() {
            Some(var) => var,
            None => return Decision::Exhausted,
        };
        let lit = Lit::new(var, true);
        self.assign(lit);
        self.decisions.push(lit);
        self.stats.decisions += 1;
        debug!("Decide {} at level {}", lit, self.decisions.len());
        Decision::Decided(lit)
    }

    /// Undoes the trail back to the most recent decision that has only been
    /// tried as true, and retries it as false. Implied literals and
    /// decisions already tried both ways go back to the pending pool.
    pub fn backtrack(&mut self) -> Backtrack {
        self.stats.backtracks += 1;
        while let Some(&decision) = self.decisions.last() {
            let lit = self.trail.pop().expect("decision missing from the trail");
            self.markers.clear(lit);

            if lit.var != decision.var {
                self.pending.insert(lit.var);
                continue;
            }

            self.decisions.pop();
            if lit.val {
                let flipped = !lit;
                self.assign(flipped);
                self.decisions.push(flipped);
                debug!("Backtrack: retry {} at level {}", flipped, self.decisions.len());
                return Backtrack::Flipped(flipped);
            }
            self.pending.insert(lit.var);
        }
        debug!("Backtrack: no decisions left");
        Backtrack::Exhausted
    }

    fn assign(&mut self, lit: Lit) {
        self.markers.set(lit);
        self.trail.push(lit);
    }
}
