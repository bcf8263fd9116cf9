//! Resource id generation

use std::cell::Cell;
use uuid::Uuid;

/// How resource ids are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Random UUID v4 per resource
    #[default]
    Random,
    /// `00000000-0000-4000-0000-{n:012}`, counting from 1 for each export
    Sequential,
}

/// Generator for one export call
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    next: Cell<u64>,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            next: Cell::new(1),
        }
    }

    pub fn next_id(&self) -> String {
        match self.strategy {
            IdStrategy::Random => Uuid::new_v4().to_string(),
            IdStrategy::Sequential => {
                let n = self.next.get();
                self.next.set(n + 1);
                sequential_id(n)
            }
        }
    }
}

pub fn sequential_id(n: u64) -> String {
    format!("00000000-0000-4000-0000-{:012}", n)
}

/// `urn:uuid:` full url for a bundle entry
pub fn urn_uuid(id: &str) -> String {
    format!("urn:uuid:{}", id)
}
