//! Deterministic ID generator.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::IdGenerator;

/// Produces `run-0001`, `run-0002`, ... in call order.
#[derive(Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("run-{n:04}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let gen = SequentialIdGenerator::default();
        assert_eq!(gen.generate_id(), "run-0001");
        assert_eq!(gen.generate_id(), "run-0002");
    }
}
