use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of 16-bit transaction ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u16;
}

/// Unpredictable ids, the default. Drawn from the thread-local CSPRNG,
/// which is seeded and periodically reseeded from OS entropy, so an
/// off-path sender cannot guess the id of an outstanding query.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> u16 {
        rand::random()
    }
}

/// Hands out a fixed list of ids in order, wrapping around at the end.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    ids: Vec<u16>,
    next: AtomicUsize,
}

impl SequenceIdGenerator {
    pub fn new(ids: impl Into<Vec<u16>>) -> Self {
        let mut ids = ids.into();
        if ids.is_empty() {
            ids.push(0);
        }
        Self {
            ids,
            next: AtomicUsize::new(0),
        }
    }

    /// 1, 2, 3, ... 65535, 0, 1, ...
    pub fn counting() -> Self {
        Self::new((1..=u16::MAX).chain([0]).collect::<Vec<_>>())
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self) -> u16 {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        self.ids[index % self.ids.len()]
    }
}
