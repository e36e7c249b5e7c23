//! Typed record storage.
//!
//! Everything the service persists (orders, users, product listings) goes
//! through [`Repository`], so the backend can be swapped without touching the
//! engine. [`MemoryRepository`] is the only backend shipped.

pub mod memory;

use uuid::Uuid;

use crate::error::LedgerError;

pub use memory::MemoryRepository;

/// A value addressable by a stable id.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

/// Closure run against the current record while it is exclusively held.
pub type Mutation<'a, T> = &'a mut dyn FnMut(&T) -> Result<T, LedgerError>;

pub trait Repository<T: Record>: Send + Sync {
    fn get(&self, id: &Uuid) -> Option<T>;

    /// Inserts or replaces the record under its own id.
    fn put(&self, record: T);

    fn list(&self) -> Vec<T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-modify-write under the record's lock. The mutation sees the
    /// latest stored value; when it returns `Err` nothing is written.
    /// Returns `None` if no record has that id.
    fn update(&self, id: &Uuid, mutation: Mutation<'_, T>) -> Option<Result<T, LedgerError>>;
}
