use dashmap::DashMap;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::store::{Mutation, Record, Repository};

/// In-process backend. Each key is guarded by its dashmap shard lock, so
/// writes to one record are serialized while different records proceed in
/// parallel.
pub struct MemoryRepository<T: Record> {
    records: DashMap<Uuid, T>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn get(&self, id: &Uuid) -> Option<T> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    fn put(&self, record: T) {
        self.records.insert(record.id(), record);
    }

    fn list(&self) -> Vec<T> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn update(&self, id: &Uuid, mutation: Mutation<'_, T>) -> Option<Result<T, LedgerError>> {
        let mut entry = self.records.get_mut(id)?;
        let outcome = mutation(entry.value()).map(|next| {
            *entry.value_mut() = next.clone();
            next
        });
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        id: Uuid,
        hits: u32,
    }

    impl Record for Counter {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[test]
    fn failed_mutation_leaves_record_untouched() {
        let repo = MemoryRepository::new();
        let id = Uuid::from_u128(7);
        repo.put(Counter { id, hits: 1 });

        let result = repo.update(&id, &mut |_current| Err(LedgerError::EmptyCart));

        assert_eq!(result, Some(Err(LedgerError::EmptyCart)));
        assert_eq!(repo.get(&id).map(|c| c.hits), Some(1));
    }

    #[test]
    fn update_on_missing_record_returns_none() {
        let repo: MemoryRepository<Counter> = MemoryRepository::new();
        let result = repo.update(&Uuid::from_u128(1), &mut |current| Ok(current.clone()));
        assert!(result.is_none());
        assert!(repo.is_empty());
    }

    #[test]
    fn concurrent_updates_to_one_record_are_serialized() {
        let repo = Arc::new(MemoryRepository::new());
        let id = Uuid::from_u128(42);
        repo.put(Counter { id, hits: 0 });

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        repo.update(&id, &mut |current| {
                            Ok(Counter {
                                id: current.id,
                                hits: current.hits + 1,
                            })
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(repo.get(&id).map(|c| c.hits), Some(800));
    }
}
