//! Transposition Table
//!
//! A hash table that stores previously searched positions to avoid
//! redundant work and improve search efficiency.

use crate::core::moves::Move;
use crate::error::{EngineError, EngineResult};

/// Entry type in the transposition table
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum TTFlag {
    /// Exact score
    Exact = 0,
    /// Lower bound (beta cutoff)
    LowerBound = 1,
    /// Upper bound (failed low)
    UpperBound = 2,
}

/// A single entry in the transposition table
#[derive(Clone, Copy, Debug)]
pub struct TTEntry {
    /// Zobrist key of the position
    pub key: u64,
    pub best_move: Option<Move>,
    pub depth: i8,
    /// Mate scores are stored relative to the node, not the root
    pub score: i16,
    pub flag: TTFlag,
    /// Search generation that wrote the entry
    pub age: u8,
}

impl TTEntry {
    pub const EMPTY: TTEntry = TTEntry {
        key: 0,
        best_move: None,
        depth: 0,
        score: 0,
        flag: TTFlag::Exact,
        age: 0,
    };
}

/// Transposition table
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    age: u8,
}

impl TranspositionTable {
    /// Allocate a table of roughly `size_mb` megabytes (power-of-two entries).
    ///
    /// Fails with `AllocationFailure` instead of aborting when the memory
    /// cannot be reserved.
    pub fn new(size_mb: usize) -> EngineResult<Self> {
        let entry_size = std::mem::size_of::<TTEntry>();
        let wanted = (size_mb.max(1) * 1024 * 1024) / entry_size;
        let size = if wanted.is_power_of_two() { wanted } else { wanted.next_power_of_two() / 2 };

        let mut entries = Vec::new();
        entries.try_reserve_exact(size).map_err(|e| {
            EngineError::AllocationFailure(format!("transposition table of {} MB: {}", size_mb, e))
        })?;
        entries.resize(size, TTEntry::EMPTY);

        Ok(TranspositionTable { entries, age: 0 })
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & (self.entries.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Probe the table for an entry
    pub fn probe(&self, key: u64) -> Option<&TTEntry> {
        let entry = &self.entries[self.index(key)];
        (entry.key == key && key != 0).then_some(entry)
    }

    /// Store an entry, preferring deeper results from the current search
    pub fn store(&mut self, key: u64, best_move: Option<Move>, depth: i8, score: i16, flag: TTFlag) {
        let age = self.age;
        let idx = self.index(key);
        let entry = &mut self.entries[idx];

        let replace = entry.key == 0 || entry.age != age || depth >= entry.depth;
        if replace {
            // Keep a known move when the new result has none for the same position
            let best_move = match (best_move, entry.key == key) {
                (None, true) => entry.best_move,
                (mv, _) => mv,
            };
            *entry = TTEntry { key, best_move, depth, score, flag, age };
        }
    }

    /// Clear the table
    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::EMPTY);
        self.age = 0;
    }

    /// Increment the age counter (call at the start of each search)
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    /// Permille of sampled slots in use
    pub fn hashfull(&self) -> usize {
        let sample = 1000.min(self.entries.len());
        let used = self.entries[..sample].iter().filter(|e| e.key != 0).count();
        (used * 1000) / sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moves::MoveFlags;
    use crate::core::types::Square;

    #[test]
    fn test_size_is_power_of_two() {
        let tt = TranspositionTable::new(1).unwrap();
        assert!(tt.len().is_power_of_two());
        assert!(tt.len() * std::mem::size_of::<TTEntry>() <= 1024 * 1024);
    }

    #[test]
    fn test_store_and_probe() {
        let mut tt = TranspositionTable::new(1).unwrap();
        let mv = Move::new(Square::E1, Square::E8, MoveFlags::QUIET);
        tt.store(0xABCD, Some(mv), 3, 42, TTFlag::Exact);
        let entry = tt.probe(0xABCD).unwrap();
        assert_eq!(entry.best_move, Some(mv));
        assert_eq!(entry.score, 42);
        assert!(tt.probe(0xABCE).is_none());
        tt.clear();
        assert!(tt.probe(0xABCD).is_none());
    }

    #[test]
    fn test_shallower_entry_does_not_replace_in_same_search() {
        let mut tt = TranspositionTable::new(1).unwrap();
        tt.store(7, None, 5, 10, TTFlag::Exact);
        tt.store(7, None, 2, 99, TTFlag::LowerBound);
        assert_eq!(tt.probe(7).unwrap().score, 10);
        tt.new_search();
        tt.store(7, None, 2, 99, TTFlag::LowerBound);
        assert_eq!(tt.probe(7).unwrap().score, 99);
    }

    #[test]
    fn test_huge_table_reports_allocation_failure() {
        let result = TranspositionTable::new(usize::MAX / (1024 * 1024));
        assert!(matches!(result, Err(EngineError::AllocationFailure(_))));
    }
}
