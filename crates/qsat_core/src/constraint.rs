//! Literals, clauses, and the ordered constraint set of one model build.

use core::fmt;
use core::ops::Not;

/// Boolean variable identifier. Identifiers start at 1, as in DIMACS.
pub type VarId = u32;

/// Signed literal stored as a DIMACS integer.
///
/// Positive values assert the variable, negative values its negation. The
/// variable pool caps identifiers at `i32::MAX`, so the conversion from
/// `VarId` never truncates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lit(i32);

impl Lit {
    /// Literal asserting `var`.
    #[inline]
    pub fn pos(var: VarId) -> Self {
        debug_assert!(var > 0 && var <= i32::MAX as u32);
        Self(var as i32)
    }

    /// Literal asserting the negation of `var`.
    #[inline]
    pub fn neg(var: VarId) -> Self {
        debug_assert!(var > 0 && var <= i32::MAX as u32);
        Self(-(var as i32))
    }

    /// Literal that is satisfied exactly when `var` equals `value`.
    #[inline]
    pub fn with_value(var: VarId, value: bool) -> Self {
        if value { Self::pos(var) } else { Self::neg(var) }
    }

    #[inline]
    pub fn var(self) -> VarId {
        self.0.unsigned_abs()
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn to_dimacs(self) -> i32 {
        self.0
    }

    /// Evaluates the literal under a variable assignment.
    #[inline]
    pub fn eval(self, value_of: impl Fn(VarId) -> bool) -> bool {
        value_of(self.var()) == self.is_positive()
    }
}

impl Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit(-self.0)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Disjunction of literals. The empty clause is unsatisfiable.
pub type Clause = Vec<Lit>;

/// Native parity constraint `XOR(vars) = parity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorConstraint {
    pub vars: Vec<VarId>,
    pub parity: bool,
}

impl XorConstraint {
    pub fn eval(&self, value_of: impl Fn(VarId) -> bool) -> bool {
        let odd = self.vars.iter().filter(|&&v| value_of(v)).count() % 2 == 1;
        odd == self.parity
    }
}

/// Ordered clauses and native XOR constraints produced by one build.
///
/// Tracks the highest variable identifier referenced so far so that back
/// ends can declare the full variable range up front, including variables
/// that appear in no clause.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    clauses: Vec<Clause>,
    xors: Vec<XorConstraint>,
    num_vars: u32,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a clause, extending the variable range if needed.
    pub fn add_clause(&mut self, clause: Clause) {
        for lit in &clause {
            self.num_vars = self.num_vars.max(lit.var());
        }
        self.clauses.push(clause);
    }

    /// Appends a native XOR constraint, extending the variable range if needed.
    pub fn add_xor(&mut self, xor: XorConstraint) {
        for &var in &xor.vars {
            self.num_vars = self.num_vars.max(var);
        }
        self.xors.push(xor);
    }

    /// Raises the declared variable count to cover `num_vars`.
    ///
    /// Used for variables that belong to the model but may appear in no
    /// clause, such as error mechanisms that flip nothing.
    pub fn declare_vars(&mut self, num_vars: u32) {
        self.num_vars = self.num_vars.max(num_vars);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn xors(&self) -> &[XorConstraint] {
        &self.xors
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn num_xors(&self) -> usize {
        self.xors.len()
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Checks every clause and XOR constraint against a total assignment.
    pub fn is_satisfied_by(&self, value_of: impl Fn(VarId) -> bool + Copy) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|lit| lit.eval(value_of)))
            && self.xors.iter().all(|xor| xor.eval(value_of))
    }
}
