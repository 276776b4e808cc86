//! In-memory table backing the `Memory*Store` implementations

use hr_core::pagination::{Page, PaginationParams};
use hr_core::traits::Id;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

pub(crate) struct MemoryTable<T> {
    rows: RwLock<BTreeMap<Id, T>>,
    next_id: AtomicI64,
}

impl<T: Clone> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn next_id(&self) -> Id {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub async fn get(&self, id: Id) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn insert(&self, id: Id, row: T) -> T {
        self.rows.write().await.insert(id, row.clone());
        row
    }

    pub async fn remove(&self, id: Id) -> Option<T> {
        self.rows.write().await.remove(&id)
    }

    pub async fn contains(&self, id: Id) -> bool {
        self.rows.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> i64 {
        self.rows.read().await.len() as i64
    }

    /// Apply `f` to the row in place and return the result
    pub async fn update<F: FnOnce(&mut T)>(&self, id: Id, f: F) -> Option<T> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id)?;
        f(row);
        Some(row.clone())
    }

    /// Matching rows, newest (highest id) first
    pub async fn filter<P: Fn(&T) -> bool>(&self, predicate: P) -> Vec<T> {
        self.rows
            .read()
            .await
            .values()
            .rev()
            .filter(|row| predicate(*row))
            .cloned()
            .collect()
    }

    pub async fn any<P: Fn(&T) -> bool>(&self, predicate: P) -> bool {
        self.rows.read().await.values().any(predicate)
    }

    pub async fn page<P: Fn(&T) -> bool>(&self, predicate: P, params: PaginationParams) -> Page<T> {
        Page::slice(self.filter(predicate).await, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_and_ordering() {
        let table = MemoryTable::new();
        for name in ["a", "b", "c"] {
            let id = table.next_id();
            table.insert(id, name.to_string()).await;
        }

        assert_eq!(table.filter(|_| true).await, vec!["c", "b", "a"]);
        assert_eq!(table.update(2, |s| s.push('!')).await.as_deref(), Some("b!"));
        assert!(table.update(9, |s| s.clear()).await.is_none());
        assert_eq!(table.remove(1).await.as_deref(), Some("a"));
        assert_eq!(table.len().await, 2);
    }
}
