//! Parity constraint encodings.
//!
//! Every detector and observable constraint in a failure check is a parity
//! constraint `XOR(vars) = target`. Small arities are encoded by blocking each
//! wrong-parity assignment directly. Larger ones go through Tseitin XOR gates,
//! either chained linearly or arranged as a balanced tree, or are passed
//! through untouched as native XOR constraints.
//!
//! Both Tseitin layouts on `n` inputs allocate exactly `n - 1` gate outputs
//! and emit `4 * (n - 1) + 1` clauses. They differ only in implication depth:
//! `O(n)` for the chain, `O(log n)` for the tree.

use crate::QsatError;
use crate::constraint::{ConstraintSet, Lit, VarId, XorConstraint};
use crate::pool::VarPool;
use core::fmt;
use core::str::FromStr;

/// Strategy for parity constraints above the brute-force arity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum XorEncoding {
    /// Linear chain of XOR gates.
    #[default]
    ChainTseitin,
    /// Balanced binary tree of XOR gates.
    TreeTseitin,
    /// Native XOR constraints, for back ends with Gaussian elimination.
    NativeXor,
}

impl XorEncoding {
    pub const ALL: [XorEncoding; 3] = [
        XorEncoding::ChainTseitin,
        XorEncoding::TreeTseitin,
        XorEncoding::NativeXor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            XorEncoding::ChainTseitin => "chain_tseitin",
            XorEncoding::TreeTseitin => "tree_tseitin",
            XorEncoding::NativeXor => "native_xor",
        }
    }
}

impl FromStr for XorEncoding {
    type Err = QsatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chain_tseitin" | "chain" => Ok(XorEncoding::ChainTseitin),
            "tree_tseitin" | "tree" => Ok(XorEncoding::TreeTseitin),
            "native_xor" | "native" => Ok(XorEncoding::NativeXor),
            other => Err(QsatError::UnsupportedEncodingMethod(other.to_string())),
        }
    }
}

impl fmt::Display for XorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emits the four clauses of `c = a XOR b`.
///
/// Clause order and polarity are fixed:
/// `(¬a ∨ ¬b ∨ ¬c) (a ∨ b ∨ ¬c) (a ∨ ¬b ∨ c) (¬a ∨ b ∨ c)`.
#[inline]
pub fn xor_gate(a: Lit, b: Lit, c: Lit, out: &mut ConstraintSet) {
    out.add_clause(vec![!a, !b, !c]);
    out.add_clause(vec![a, b, !c]);
    out.add_clause(vec![a, !b, c]);
    out.add_clause(vec![!a, b, c]);
}

/// Blocks every assignment of `vars` whose parity differs from `target`.
///
/// Emits `2^(n-1)` clauses for `n >= 1` and allocates nothing. Assignment
/// masks are enumerated in increasing order with bit `i` standing for
/// `vars[i]`. With no variables the parity is always even, so `target = true`
/// yields the empty clause and `target = false` yields nothing.
pub fn encode_brute_force(vars: &[VarId], target: bool, out: &mut ConstraintSet) {
    let n = vars.len();
    debug_assert!(n < usize::BITS as usize);
    for mask in 0usize..(1 << n) {
        let odd = mask.count_ones() % 2 == 1;
        if odd == target {
            continue;
        }
        let clause = vars
            .iter()
            .enumerate()
            .map(|(i, &v)| Lit::with_value(v, (mask >> i) & 1 == 0))
            .collect();
        out.add_clause(clause);
    }
}

/// Chains `a_1 = v_1 ⊕ v_2`, `a_i = a_{i-1} ⊕ v_{i+1}` and fixes the last gate.
///
/// A single variable is fixed directly. An empty list falls back to the
/// brute-force rule.
pub fn encode_chain(
    vars: &[VarId],
    target: bool,
    pool: &mut VarPool,
    out: &mut ConstraintSet,
) -> Result<(), QsatError> {
    match vars {
        [] => encode_brute_force(vars, target, out),
        [only] => out.add_clause(vec![Lit::with_value(*only, target)]),
        [first, rest @ ..] => {
            let mut acc = *first;
            for &v in rest {
                let gate = pool.fresh()?;
                xor_gate(Lit::pos(acc), Lit::pos(v), Lit::pos(gate), out);
                acc = gate;
            }
            out.add_clause(vec![Lit::with_value(acc, target)]);
        }
    }
    Ok(())
}

/// Pairs up the current level into XOR gates until one root remains, then
/// fixes the root.
///
/// An unpaired element at the end of a level moves up unchanged.
pub fn encode_tree(
    vars: &[VarId],
    target: bool,
    pool: &mut VarPool,
    out: &mut ConstraintSet,
) -> Result<(), QsatError> {
    if vars.is_empty() {
        encode_brute_force(vars, target, out);
        return Ok(());
    }

    let mut level = vars.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            if i + 1 < level.len() {
                let gate = pool.fresh()?;
                xor_gate(
                    Lit::pos(level[i]),
                    Lit::pos(level[i + 1]),
                    Lit::pos(gate),
                    out,
                );
                next.push(gate);
                i += 2;
            } else {
                next.push(level[i]);
                i += 1;
            }
        }
        level = next;
    }

    out.add_clause(vec![Lit::with_value(level[0], target)]);
    Ok(())
}

/// Parity encoder dispatching on arity and configured strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParityEncoder {
    method: XorEncoding,
    brute_force_limit: usize,
}

impl ParityEncoder {
    /// Arity up to which blocking clauses are used.
    pub const DEFAULT_BRUTE_FORCE_LIMIT: usize = 3;

    /// Keeps the blocking-clause count at or below 2048 per constraint.
    pub const MAX_BRUTE_FORCE_LIMIT: usize = 12;

    pub fn new(method: XorEncoding) -> Self {
        Self {
            method,
            brute_force_limit: Self::DEFAULT_BRUTE_FORCE_LIMIT,
        }
    }

    /// Overrides the brute-force arity threshold.
    pub fn with_brute_force_limit(mut self, limit: usize) -> Result<Self, QsatError> {
        if limit > Self::MAX_BRUTE_FORCE_LIMIT {
            return Err(QsatError::BruteForceLimitTooLarge {
                limit,
                max: Self::MAX_BRUTE_FORCE_LIMIT,
            });
        }
        self.brute_force_limit = limit;
        Ok(self)
    }

    pub fn method(&self) -> XorEncoding {
        self.method
    }

    pub fn brute_force_limit(&self) -> usize {
        self.brute_force_limit
    }

    /// Constrains `XOR(vars) = target`.
    ///
    /// Native XOR bypasses the arity dispatch entirely for non-empty lists.
    /// Otherwise lists of at most `brute_force_limit` variables are
    /// enumerated and longer ones go through the configured Tseitin layout.
    /// The caller guarantees that `vars` holds distinct, allocated ids.
    pub fn encode(
        &self,
        vars: &[VarId],
        target: bool,
        pool: &mut VarPool,
        out: &mut ConstraintSet,
    ) -> Result<(), QsatError> {
        let short = vars.len() <= self.brute_force_limit.max(1);
        match self.method {
            XorEncoding::NativeXor if !vars.is_empty() => {
                out.add_xor(XorConstraint {
                    vars: vars.to_vec(),
                    parity: target,
                });
                Ok(())
            }
            // an empty native list lands here: it has no xor form
            XorEncoding::NativeXor => {
                encode_brute_force(vars, target, out);
                Ok(())
            }
            _ if short => {
                encode_brute_force(vars, target, out);
                Ok(())
            }
            XorEncoding::ChainTseitin => encode_chain(vars, target, pool, out),
            XorEncoding::TreeTseitin => encode_tree(vars, target, pool, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Strategy = fn(&[VarId], bool, &mut VarPool, &mut ConstraintSet) -> Result<(), QsatError>;

    fn brute(
        vars: &[VarId],
        target: bool,
        _: &mut VarPool,
        out: &mut ConstraintSet,
    ) -> Result<(), QsatError> {
        encode_brute_force(vars, target, out);
        Ok(())
    }

    const STRATEGIES: [(&str, Strategy); 3] =
        [("brute", brute), ("chain", encode_chain), ("tree", encode_tree)];

    fn encode_with(strategy: Strategy, n: usize, target: bool) -> (ConstraintSet, u32) {
        let vars: Vec<VarId> = (1..=n as VarId).collect();
        let mut pool = VarPool::new(n).unwrap();
        let mut out = ConstraintSet::new();
        strategy(&vars, target, &mut pool, &mut out).unwrap();
        (out, pool.num_allocated() - n as u32)
    }

    /// Whether some auxiliary assignment extends `inputs` to a model.
    fn extends(set: &ConstraintSet, n: usize, aux: u32, inputs: usize) -> bool {
        (0u64..(1 << aux)).any(|aux_mask| {
            set.is_satisfied_by(|v| {
                let v = v as usize;
                if v <= n {
                    (inputs >> (v - 1)) & 1 == 1
                } else {
                    (aux_mask >> (v - n - 1)) & 1 == 1
                }
            })
        })
    }

    #[test]
    fn xor_gate_matches_truth_table() {
        let mut set = ConstraintSet::new();
        xor_gate(Lit::pos(1), Lit::pos(2), Lit::pos(3), &mut set);
        assert_eq!(set.num_clauses(), 4);
        assert_eq!(
            set.clauses()[0],
            vec![Lit::neg(1), Lit::neg(2), Lit::neg(3)]
        );
        for mask in 0..8u32 {
            let (a, b, c) = (mask & 1 == 1, mask & 2 == 2, mask & 4 == 4);
            let sat = set.is_satisfied_by(|v| match v {
                1 => a,
                2 => b,
                _ => c,
            });
            assert_eq!(sat, c == (a ^ b), "a={a} b={b} c={c}");
        }
    }

    #[test]
    fn strategies_are_equivalent_on_every_input() {
        for n in 1..=8 {
            for target in [false, true] {
                for (name, strategy) in STRATEGIES {
                    let (set, aux) = encode_with(strategy, n, target);
                    for inputs in 0usize..(1 << n) {
                        let parity = inputs.count_ones() % 2 == 1;
                        assert_eq!(
                            extends(&set, n, aux, inputs),
                            parity == target,
                            "{name} n={n} target={target} inputs={inputs:b}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn auxiliary_and_clause_counts() {
        for n in 1..=10 {
            for target in [false, true] {
                let (set, aux) = encode_with(brute, n, target);
                assert_eq!(aux, 0);
                assert_eq!(set.num_clauses(), 1 << (n - 1));

                for strategy in [encode_chain as Strategy, encode_tree] {
                    let (set, aux) = encode_with(strategy, n, target);
                    assert_eq!(aux as usize, n - 1);
                    assert_eq!(set.num_clauses(), 4 * (n - 1) + 1);
                }
            }
        }
    }

    #[test]
    fn empty_list_is_trivial_or_contradictory() {
        for (_, strategy) in STRATEGIES {
            let (even, _) = encode_with(strategy, 0, false);
            assert_eq!(even.num_clauses(), 0);

            let (odd, _) = encode_with(strategy, 0, true);
            assert_eq!(odd.clauses(), &[Vec::<Lit>::new()]);
        }
    }

    #[test]
    fn single_literal_is_fixed_directly() {
        let (set, aux) = encode_with(encode_chain, 1, false);
        assert_eq!(aux, 0);
        assert_eq!(set.clauses(), &[vec![Lit::neg(1)]]);

        let (set, _) = encode_with(encode_tree, 1, true);
        assert_eq!(set.clauses(), &[vec![Lit::pos(1)]]);
    }

    #[test]
    fn chain_feeds_each_gate_into_the_next() {
        let (set, _) = encode_with(encode_chain, 4, false);
        // gates 5 = 1^2, 6 = 5^3, 7 = 6^4
        assert_eq!(set.clauses()[0], vec![Lit::neg(1), Lit::neg(2), Lit::neg(5)]);
        assert_eq!(set.clauses()[4], vec![Lit::neg(5), Lit::neg(3), Lit::neg(6)]);
        assert_eq!(set.clauses()[8], vec![Lit::neg(6), Lit::neg(4), Lit::neg(7)]);
        assert_eq!(set.clauses()[12], vec![Lit::neg(7)]);
    }

    #[test]
    fn tree_carries_odd_element_up() {
        let (set, _) = encode_with(encode_tree, 5, true);
        // level 1: 6 = 1^2, 7 = 3^4, 5 carried; level 2: 8 = 6^7; level 3: 9 = 8^5
        assert_eq!(set.clauses()[0], vec![Lit::neg(1), Lit::neg(2), Lit::neg(6)]);
        assert_eq!(set.clauses()[4], vec![Lit::neg(3), Lit::neg(4), Lit::neg(7)]);
        assert_eq!(set.clauses()[8], vec![Lit::neg(6), Lit::neg(7), Lit::neg(8)]);
        assert_eq!(set.clauses()[12], vec![Lit::neg(8), Lit::neg(5), Lit::neg(9)]);
        assert_eq!(set.clauses()[16], vec![Lit::pos(9)]);
    }

    #[test]
    fn dispatch_respects_brute_force_limit() {
        let vars: Vec<VarId> = (1..=4).collect();

        let encoder = ParityEncoder::new(XorEncoding::ChainTseitin);
        let mut pool = VarPool::new(4).unwrap();
        let mut out = ConstraintSet::new();
        encoder.encode(&vars[..3], false, &mut pool, &mut out).unwrap();
        assert_eq!(out.num_clauses(), 4);
        assert_eq!(pool.num_allocated(), 4);

        encoder.encode(&vars, false, &mut pool, &mut out).unwrap();
        assert_eq!(pool.num_allocated(), 7);

        let wide = ParityEncoder::new(XorEncoding::TreeTseitin)
            .with_brute_force_limit(4)
            .unwrap();
        let mut pool = VarPool::new(4).unwrap();
        let mut out = ConstraintSet::new();
        wide.encode(&vars, true, &mut pool, &mut out).unwrap();
        assert_eq!(out.num_clauses(), 8);
        assert_eq!(pool.num_allocated(), 4);
    }

    #[test]
    fn zero_limit_still_fixes_single_literals() {
        let encoder = ParityEncoder::new(XorEncoding::TreeTseitin)
            .with_brute_force_limit(0)
            .unwrap();
        let mut pool = VarPool::new(1).unwrap();
        let mut out = ConstraintSet::new();
        encoder.encode(&[1], true, &mut pool, &mut out).unwrap();
        assert_eq!(out.clauses(), &[vec![Lit::pos(1)]]);
    }

    #[test]
    fn native_xor_bypasses_tseitin() {
        let encoder = ParityEncoder::new(XorEncoding::NativeXor);
        let mut pool = VarPool::new(6).unwrap();
        let mut out = ConstraintSet::new();
        encoder.encode(&[1, 2, 3, 4, 5, 6], false, &mut pool, &mut out).unwrap();
        encoder.encode(&[], false, &mut pool, &mut out).unwrap();
        assert_eq!(out.num_clauses(), 0);
        assert_eq!(
            out.xors(),
            &[XorConstraint {
                vars: vec![1, 2, 3, 4, 5, 6],
                parity: false
            }]
        );
        assert_eq!(pool.num_allocated(), 6);
    }

    #[test]
    fn every_method_handles_every_arity() {
        for method in XorEncoding::ALL {
            for n in 0..=8 {
                for target in [false, true] {
                    let vars: Vec<VarId> = (1..=n as VarId).collect();
                    let mut pool = VarPool::new(n).unwrap();
                    let mut out = ConstraintSet::new();
                    ParityEncoder::new(method)
                        .encode(&vars, target, &mut pool, &mut out)
                        .unwrap();
                    if method == XorEncoding::NativeXor {
                        assert_eq!(out.num_xors(), usize::from(n > 0));
                    }
                }
            }
        }

        let mut pool = VarPool::new(0).unwrap();
        let mut out = ConstraintSet::new();
        ParityEncoder::new(XorEncoding::NativeXor)
            .encode(&[], true, &mut pool, &mut out)
            .unwrap();
        assert_eq!(out.clauses(), &[Vec::<Lit>::new()]);
        assert_eq!(out.num_xors(), 0);
    }

    #[test]
    fn method_tags() {
        for method in XorEncoding::ALL {
            assert_eq!(method.as_str().parse::<XorEncoding>().unwrap(), method);
        }
        assert!(matches!(
            "ladder".parse::<XorEncoding>(),
            Err(QsatError::UnsupportedEncodingMethod(_))
        ));
    }
}
