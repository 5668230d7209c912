#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate maplit;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Not;

pub mod dimacs;
pub mod dpll;
mod error;

pub use dpll::{solve, Backtrack, Decision, Model, Outcome, Propagation, Solver, Stats};
pub use error::{Error, Result};

/// A propositional variable. Variables are numbered from 1, as in DIMACS.
#[derive(Copy, Clone, Debug, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Var(usize);

impl Var {
    pub fn new(id: usize) -> Var {
        assert!(id > 0, "variables are numbered from 1");
        Var(id)
    }

    pub fn id(self) -> usize {
        self.0
    }

    /// The 0-based slot of this variable in per-variable tables.
    pub fn index(self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A variable together with the polarity an occurrence requires.
#[derive(Copy, Clone, Debug, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Lit {
    pub var: Var,
    pub val: bool,
}

impl Lit {
    pub fn new(var: Var, val: bool) -> Lit {
        Lit { var, val }
    }

    pub fn pos(id: usize) -> Lit {
        Lit::new(Var::new(id), true)
    }

    pub fn neg(id: usize) -> Lit {
        Lit::new(Var::new(id), false)
    }

    /// Builds a literal from its signed DIMACS form; `0` is not a literal.
    pub fn from_dimacs(lit: i64) -> Lit {
        assert!(lit != 0, "0 terminates a clause, it is not a literal");
        Lit::new(Var::new(lit.unsigned_abs() as usize), lit > 0)
    }

    pub fn to_dimacs(self) -> i64 {
        let id = self.var.id() as i64;
        if self.val {
            id
        } else {
            -id
        }
    }

    pub fn eval<E: Environment + ?Sized>(&self, env: &E) -> Option<bool> {
        env.value(self.var).map(|v| v == self.val)
    }
}

impl Not for Lit {
    type Output = Self;
    fn not(self) -> Self {
        let Lit { var, val } = self;
        Lit { var, val: !val }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Anything that can tell the current value of a variable, if it has one.
pub trait Environment {
    fn value(&self, var: Var) -> Option<bool>;
}

impl Environment for BTreeMap<Var, bool> {
    fn value(&self, var: Var) -> Option<bool> {
        self.get(&var).cloned()
    }
}

/// A disjunction of literals. Literal order is kept for display only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    pub fn new<I: IntoIterator<Item = Lit>>(lits: I) -> Clause {
        Clause { lits: lits.into_iter().collect() }
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

    pub fn is_unit(&self) -> bool {
        self.lits.len() == 1
    }

    /// Three-valued truth of the clause: true as soon as one literal is
    /// true, false only once every literal is assigned and false.
    pub fn eval<E: Environment + ?Sized>(&self, env: &E) -> Option<bool> {
        let mut unknown = false;
        for lit in self.lits.iter() {
            match lit.eval(env) {
                Some(true) => return Some(true),
                Some(false) => {}
                None => unknown = true,
            }
        }
        if unknown {
            None
        } else {
            Some(false)
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.lits.split_first() {
            None => write!(f, "()"),
            Some((only, [])) => write!(f, "{}", only),
            Some((first, rest)) => {
                write!(f, "({}", first)?;
                for lit in rest {
                    write!(f, " V {}", lit)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A conjunction of clauses over the variables `1..=num_vars`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Formula {
    num_vars: usize,
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new(num_vars: usize) -> Self {
        Formula { num_vars, clauses: Vec::new() }
    }

    pub fn new_var(&mut self) -> Lit {
        self.num_vars += 1;
        Lit::pos(self.num_vars)
    }

    pub fn add_clause<C: AsRef<[Lit]>>(&mut self, clause: C) {
        let lits = clause.as_ref();
        for lit in lits {
            assert!(lit.var.id() <= self.num_vars,
                    "literal {} outside of variables 1..={}",
                    lit,
                    self.num_vars);
        }
        self.clauses.push(Clause::new(lits.iter().cloned()));
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn eval<E: Environment + ?Sized>(&self, env: &E) -> Option<bool> {
        let mut unknown = false;
        for clause in self.clauses.iter() {
            match clause.eval(env) {
                Some(false) => return Some(false),
                Some(true) => {}
                None => unknown = true,
            }
        }
        if unknown {
            None
        } else {
            Some(true)
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for clause in self.clauses.iter() {
            if !first {
                write!(f, " & ")?;
            }
            write!(f, "{}", clause)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Clause, Formula, Lit, Var};
    use std::collections::BTreeMap;

    fn var(id: usize) -> Var {
        Var::new(id)
    }

    #[test]
    fn it_works() {
        let mut f = Formula::default();
        let x1 = f.new_var();
        let x2 = f.new_var();
        let x3 = f.new_var();
        f.add_clause([!x1, x2]);
        f.add_clause([x1, !x2, x3]);

        let env = btreemap!{var(1) => true, var(2) => false, var(3) => true};
        assert_eq!(f.eval(&env), Some(false));
        let env = btreemap!{var(1) => true, var(2) => true};
        assert_eq!(f.eval(&env), Some(true));
        assert_eq!(f.eval(&BTreeMap::<Var, bool>::new()), None);
    }

    #[test]
    fn clause_is_satisfied_by_any_true_literal() {
        let c = Clause::new(vec![Lit::pos(1), Lit::neg(2), Lit::pos(3)]);
        assert_eq!(c.eval(&btreemap!{var(2) => false}), Some(true));
        assert_eq!(c.eval(&btreemap!{var(1) => false, var(2) => true}), None);
        assert_eq!(c.eval(&btreemap!{var(1) => false, var(2) => true, var(3) => false}),
                   Some(false));
    }

    #[test]
    fn empty_clause_is_false() {
        assert_eq!(Clause::default().eval(&BTreeMap::<Var, bool>::new()), Some(false));
    }

    #[test]
    fn literals_round_trip_dimacs() {
        assert_eq!(Lit::from_dimacs(-3), Lit::neg(3));
        assert_eq!(Lit::from_dimacs(7).to_dimacs(), 7);
        assert_eq!(!Lit::pos(4), Lit::neg(4));
        assert_eq!(Lit::neg(4).to_string(), "-4");
    }

    #[test]
    fn pretty_prints_like_dimacs() {
        let unit = Clause::new(vec![Lit::neg(1)]);
        let c = Clause::new(vec![Lit::pos(1), Lit::neg(2)]);
        assert_eq!(unit.to_string(), "-1");
        assert_eq!(c.to_string(), "(1 V -2)");

        let mut f = Formula::new(2);
        f.add_clause(unit.lits());
        f.add_clause(c.lits());
        assert_eq!(f.to_string(), "-1 & (1 V -2)");
    }

    #[test]
    #[should_panic]
    fn rejects_literals_outside_the_formula() {
        let mut f = Formula::new(2);
        f.add_clause([Lit::pos(3)]);
    }
}
