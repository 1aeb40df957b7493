//! Variable identifier allocation for a single model build.

use crate::QsatError;
use crate::constraint::VarId;

/// Monotonically increasing counter of allocated variable identifiers.
///
/// Identifiers `1..=reserved` belong to the error mechanisms; every auxiliary
/// introduced afterwards comes from `fresh`. A pool lives for exactly one
/// build and is threaded by `&mut` through every encoding call, so no two
/// encoders can ever claim the same identifier.
#[derive(Clone, Debug)]
pub struct VarPool {
    next: u64,
    limit: u32,
}

impl VarPool {
    /// Largest identifier representable as a signed 32-bit DIMACS literal.
    pub const MAX_VAR: u32 = i32::MAX as u32;

    /// Creates a pool whose first fresh identifier is `reserved + 1`.
    pub fn new(reserved: usize) -> Result<Self, QsatError> {
        Self::with_limit(reserved, Self::MAX_VAR)
    }

    /// Creates a pool with an explicit identifier ceiling.
    pub fn with_limit(reserved: usize, limit: u32) -> Result<Self, QsatError> {
        let limit = limit.min(Self::MAX_VAR);
        if reserved as u64 > limit as u64 {
            return Err(QsatError::VariablePoolExhausted {
                next_free: 1,
                requested: reserved as u64,
                limit,
            });
        }
        Ok(Self {
            next: reserved as u64 + 1,
            limit,
        })
    }

    /// Allocates the next free identifier.
    pub fn fresh(&mut self) -> Result<VarId, QsatError> {
        if self.next > self.limit as u64 {
            return Err(QsatError::VariablePoolExhausted {
                next_free: self.next,
                requested: 1,
                limit: self.limit,
            });
        }
        let var = self.next as VarId;
        self.next += 1;
        Ok(var)
    }

    /// Allocates `count` consecutive identifiers.
    pub fn fresh_many(&mut self, count: usize) -> Result<Vec<VarId>, QsatError> {
        let last = self.next + count as u64;
        if count > 0 && last - 1 > self.limit as u64 {
            return Err(QsatError::VariablePoolExhausted {
                next_free: self.next,
                requested: count as u64,
                limit: self.limit,
            });
        }
        let vars = (self.next..last).map(|v| v as VarId).collect();
        self.next = last;
        Ok(vars)
    }

    /// The identifier the next call to `fresh` would return.
    pub fn next_free(&self) -> u64 {
        self.next
    }

    /// Highest identifier handed out so far, including reserved ones.
    pub fn num_allocated(&self) -> u32 {
        (self.next - 1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_after_reserved_block() {
        let mut pool = VarPool::new(5).unwrap();
        assert_eq!(pool.next_free(), 6);
        assert_eq!(pool.fresh().unwrap(), 6);
        assert_eq!(pool.fresh_many(3).unwrap(), vec![7, 8, 9]);
        assert_eq!(pool.num_allocated(), 9);
    }

    #[test]
    fn empty_reservation() {
        let mut pool = VarPool::new(0).unwrap();
        assert_eq!(pool.num_allocated(), 0);
        assert_eq!(pool.fresh().unwrap(), 1);
        assert!(pool.fresh_many(0).unwrap().is_empty());
        assert_eq!(pool.num_allocated(), 1);
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut pool = VarPool::with_limit(2, 4).unwrap();
        assert_eq!(pool.fresh().unwrap(), 3);
        assert!(matches!(
            pool.fresh_many(2),
            Err(QsatError::VariablePoolExhausted { .. })
        ));
        assert_eq!(pool.fresh().unwrap(), 4);
        assert!(matches!(
            pool.fresh(),
            Err(QsatError::VariablePoolExhausted { .. })
        ));
    }

    #[test]
    fn reservation_past_limit_fails() {
        assert!(VarPool::with_limit(10, 9).is_err());
        assert!(VarPool::with_limit(9, 9).is_ok());
    }
}
