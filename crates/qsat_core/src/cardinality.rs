//! At-most-k cardinality encodings.
//!
//! Contract shared by every encoder: when `k >= vars.len()` the constraint is
//! vacuous and nothing is emitted or allocated; when `k == 0` every variable
//! is forced false with a unit clause; otherwise auxiliaries are drawn from
//! the pool in a fixed order and the pool frontier reflects exactly what was
//! consumed.

use crate::QsatError;
use crate::constraint::{ConstraintSet, Lit, VarId};
use crate::pool::VarPool;

pub trait CardinalityEncoder {
    fn name(&self) -> &'static str;

    /// Constrains at most `k` of `vars` to be true.
    fn encode_at_most(
        &self,
        vars: &[VarId],
        k: usize,
        pool: &mut VarPool,
        out: &mut ConstraintSet,
    ) -> Result<(), QsatError>;
}

/// Handles the two degenerate bounds. Returns `true` when nothing is left to do.
fn trivial_bound(vars: &[VarId], k: usize, out: &mut ConstraintSet) -> bool {
    if k >= vars.len() {
        return true;
    }
    if k == 0 {
        for &v in vars {
            out.add_clause(vec![Lit::neg(v)]);
        }
        return true;
    }
    false
}

/// Totalizer encoding (Bailleux & Boufkhad) with outputs truncated at `k + 1`.
///
/// Each internal node holds unary outputs `r_1..r_m`, where `r_j` is forced
/// true once at least `j` inputs below the node are true. Only the upward
/// implications are emitted, which is all an upper bound needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Totalizer;

impl Totalizer {
    fn build(
        vars: &[VarId],
        cap: usize,
        pool: &mut VarPool,
        out: &mut ConstraintSet,
    ) -> Result<Vec<VarId>, QsatError> {
        if vars.len() == 1 {
            return Ok(vars.to_vec());
        }

        let (left, right) = vars.split_at(vars.len() / 2);
        let a = Self::build(left, cap, pool, out)?;
        let b = Self::build(right, cap, pool, out)?;

        let m = (a.len() + b.len()).min(cap);
        let r = pool.fresh_many(m)?;

        for i in 0..=a.len() {
            for j in 0..=b.len() {
                let sum = i + j;
                if sum == 0 || sum > m {
                    continue;
                }
                let mut clause = Vec::with_capacity(3);
                if i > 0 {
                    clause.push(Lit::neg(a[i - 1]));
                }
                if j > 0 {
                    clause.push(Lit::neg(b[j - 1]));
                }
                clause.push(Lit::pos(r[sum - 1]));
                out.add_clause(clause);
            }
        }

        Ok(r)
    }
}

impl CardinalityEncoder for Totalizer {
    fn name(&self) -> &'static str {
        "totalizer"
    }

    fn encode_at_most(
        &self,
        vars: &[VarId],
        k: usize,
        pool: &mut VarPool,
        out: &mut ConstraintSet,
    ) -> Result<(), QsatError> {
        if trivial_bound(vars, k, out) {
            return Ok(());
        }
        let root = Self::build(vars, k + 1, pool, out)?;
        out.add_clause(vec![Lit::neg(root[k])]);
        Ok(())
    }
}

/// Sequential counter encoding (Sinz), `(n - 1) * k` auxiliaries.
///
/// Register `s[i][j]` holds "at least `j + 1` of the first `i + 1` inputs are
/// true".
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialCounter;

impl CardinalityEncoder for SequentialCounter {
    fn name(&self) -> &'static str {
        "seqcounter"
    }

    fn encode_at_most(
        &self,
        vars: &[VarId],
        k: usize,
        pool: &mut VarPool,
        out: &mut ConstraintSet,
    ) -> Result<(), QsatError> {
        if trivial_bound(vars, k, out) {
            return Ok(());
        }

        let n = vars.len();
        let mut s: Vec<Vec<VarId>> = Vec::with_capacity(n - 1);
        for _ in 0..n - 1 {
            s.push(pool.fresh_many(k)?);
        }

        out.add_clause(vec![Lit::neg(vars[0]), Lit::pos(s[0][0])]);
        for j in 1..k {
            out.add_clause(vec![Lit::neg(s[0][j])]);
        }

        for i in 1..n - 1 {
            let x = vars[i];
            out.add_clause(vec![Lit::neg(x), Lit::pos(s[i][0])]);
            out.add_clause(vec![Lit::neg(s[i - 1][0]), Lit::pos(s[i][0])]);
            for j in 1..k {
                out.add_clause(vec![Lit::neg(x), Lit::neg(s[i - 1][j - 1]), Lit::pos(s[i][j])]);
                out.add_clause(vec![Lit::neg(s[i - 1][j]), Lit::pos(s[i][j])]);
            }
            out.add_clause(vec![Lit::neg(x), Lit::neg(s[i - 1][k - 1])]);
        }

        out.add_clause(vec![Lit::neg(vars[n - 1]), Lit::neg(s[n - 2][k - 1])]);
        Ok(())
    }
}
