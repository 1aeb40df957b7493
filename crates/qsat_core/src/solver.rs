//! Solver back-end adapter.
//!
//! The builder only ever talks to a `SolverBackend`. Back ends come in two
//! flavours: CNF-only engines, which reject native XOR constraints, and
//! engines with Gaussian elimination, which accept them.

use crate::QsatError;
use crate::constraint::{ConstraintSet, Lit, VarId, XorConstraint};
use bitvec::prelude::*;
use varisat::ExtendFormula;

/// Total assignment returned by a satisfiable solve.
///
/// Bit `v` holds the value of variable `v`; bit 0 is unused. Variables the
/// engine never saw read as false.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    values: BitVec<u64, Lsb0>,
}

impl Assignment {
    pub fn new(num_vars: u32) -> Self {
        Self {
            values: bitvec![u64, Lsb0; 0; num_vars as usize + 1],
        }
    }

    pub fn set(&mut self, var: VarId, value: bool) {
        let index = var as usize;
        if index >= self.values.len() {
            self.values.resize(index + 1, false);
        }
        self.values.set(index, value);
    }

    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var as usize).is_some_and(|bit| *bit)
    }

    /// Highest variable covered by the assignment.
    pub fn num_vars(&self) -> u32 {
        self.values.len().saturating_sub(1) as u32
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable(Assignment),
    Unsatisfiable,
}

impl Verdict {
    pub fn is_sat(&self) -> bool {
        matches!(self, Verdict::Satisfiable(_))
    }
}

/// Narrow capability interface over a SAT engine.
pub trait SolverBackend {
    fn name(&self) -> &'static str;

    /// Whether `add_xor` is accepted.
    fn supports_xor(&self) -> bool {
        false
    }

    /// Makes variables `1..=count` available to clauses.
    fn declare_variables(&mut self, count: u32);

    /// Adds a clause over declared variables.
    fn add_clause(&mut self, clause: &[Lit]) -> Result<(), QsatError>;

    /// Adds a native XOR constraint.
    fn add_xor(&mut self, _xor: &XorConstraint) -> Result<(), QsatError> {
        Err(QsatError::XorUnsupported {
            backend: self.name(),
        })
    }

    fn solve(&mut self) -> Result<Verdict, QsatError>;

    /// Declares the variable range of `set` and adds every constraint in
    /// insertion order.
    fn load(&mut self, set: &ConstraintSet) -> Result<(), QsatError> {
        if set.num_xors() > 0 && !self.supports_xor() {
            return Err(QsatError::XorUnsupported {
                backend: self.name(),
            });
        }
        self.declare_variables(set.num_vars());
        for clause in set.clauses() {
            self.add_clause(clause)?;
        }
        for xor in set.xors() {
            self.add_xor(xor)?;
        }
        Ok(())
    }
}

impl<B: SolverBackend + ?Sized> SolverBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports_xor(&self) -> bool {
        (**self).supports_xor()
    }

    fn declare_variables(&mut self, count: u32) {
        (**self).declare_variables(count)
    }

    fn add_clause(&mut self, clause: &[Lit]) -> Result<(), QsatError> {
        (**self).add_clause(clause)
    }

    fn add_xor(&mut self, xor: &XorConstraint) -> Result<(), QsatError> {
        (**self).add_xor(xor)
    }

    fn solve(&mut self) -> Result<Verdict, QsatError> {
        (**self).solve()
    }

    fn load(&mut self, set: &ConstraintSet) -> Result<(), QsatError> {
        (**self).load(set)
    }
}

/// Adapter over the pure-Rust varisat CDCL solver. CNF only.
pub struct VarisatBackend {
    solver: varisat::Solver<'static>,
    declared: u32,
}

impl Default for VarisatBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VarisatBackend {
    pub fn new() -> Self {
        Self {
            solver: varisat::Solver::new(),
            declared: 0,
        }
    }
}

impl SolverBackend for VarisatBackend {
    fn name(&self) -> &'static str {
        "varisat"
    }

    fn declare_variables(&mut self, count: u32) {
        self.declared = self.declared.max(count);
    }

    fn add_clause(&mut self, clause: &[Lit]) -> Result<(), QsatError> {
        let mut lits = Vec::with_capacity(clause.len());
        for &lit in clause {
            if lit.var() == 0 || lit.var() > self.declared {
                return Err(QsatError::InvalidLiteral {
                    var: lit.var(),
                    declared: self.declared,
                });
            }
            lits.push(varisat::Lit::from_dimacs(lit.to_dimacs() as isize));
        }
        self.solver.add_clause(&lits);
        Ok(())
    }

    fn solve(&mut self) -> Result<Verdict, QsatError> {
        let sat = self
            .solver
            .solve()
            .map_err(|e| QsatError::Solver(e.to_string()))?;
        if !sat {
            return Ok(Verdict::Unsatisfiable);
        }

        let model = self
            .solver
            .model()
            .ok_or_else(|| QsatError::Solver("satisfiable solve returned no model".into()))?;
        let mut assignment = Assignment::new(self.declared);
        for lit in model {
            let var = lit.var().to_dimacs() as VarId;
            if var <= self.declared {
                assignment.set(var, lit.is_positive());
            }
        }
        Ok(Verdict::Satisfiable(assignment))
    }
}
