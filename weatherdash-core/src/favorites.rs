use crate::{error::FavoritesError, storage::KeyValueStore};

pub const MAX_FAVORITES: usize = 5;

/// Storage key holding the JSON-encoded list.
pub const FAVORITES_KEY: &str = "favoriteCities";

/// Bounded, ordered, persisted list of favorite city names.
///
/// Uniqueness is by exact, case-sensitive match. Every mutation writes the
/// whole list back to the store.
#[derive(Debug)]
pub struct FavoritesRegistry<S> {
    cities: Vec<String>,
    store: S,
}

impl<S: KeyValueStore> FavoritesRegistry<S> {
    /// Read the persisted list. Absent or malformed data yields an empty list.
    pub fn load(store: S) -> Self {
        let mut cities: Vec<String> = match store.get(FAVORITES_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed favorites list: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut seen = Vec::with_capacity(cities.len());
        cities.retain(|city| {
            if seen.contains(city) {
                false
            } else {
                seen.push(city.clone());
                true
            }
        });
        cities.truncate(MAX_FAVORITES);

        tracing::debug!(count = cities.len(), "loaded favorites");
        Self { cities, store }
    }

    pub fn list(&self) -> &[String] {
        &self.cities
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cities.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cities.len() >= MAX_FAVORITES
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    pub fn add(&mut self, city: impl Into<String>) -> Result<(), FavoritesError> {
        let city = city.into();

        if self.contains(&city) {
            return Err(FavoritesError::DuplicateCity(city));
        }
        if self.is_full() {
            return Err(FavoritesError::CapacityExceeded { max: MAX_FAVORITES });
        }

        self.cities.push(city);
        if let Err(e) = self.persist() {
            self.cities.pop();
            return Err(e);
        }

        Ok(())
    }

    /// Remove the entry at `index` once `confirm` approves it.
    ///
    /// Returns the removed city, or `None` when the confirmation was declined.
    pub fn remove<F>(&mut self, index: usize, confirm: F) -> Result<Option<String>, FavoritesError>
    where
        F: FnOnce(&str) -> bool,
    {
        let city = self
            .cities
            .get(index)
            .ok_or(FavoritesError::IndexOutOfRange(index))?;

        if !confirm(city) {
            return Ok(None);
        }

        let removed = self.cities.remove(index);
        if let Err(e) = self.persist() {
            self.cities.insert(index, removed);
            return Err(e);
        }

        Ok(Some(removed))
    }

    fn persist(&mut self) -> Result<(), FavoritesError> {
        let json = serde_json::to_string(&self.cities).map_err(crate::error::StoreError::from)?;
        self.store.set(FAVORITES_KEY, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::StoreError, storage::MemoryStore};

    /// Store whose writes can be switched to fail.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Io {
                    path: "storage.json".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }
    }

    fn flaky_registry_with(cities: &[&str]) -> FavoritesRegistry<FlakyStore> {
        let mut registry = FavoritesRegistry::load(FlakyStore::default());
        for city in cities {
            registry.add(*city).unwrap();
        }
        registry.store.fail_writes = true;
        registry
    }

    fn stored(store: &impl KeyValueStore) -> Vec<String> {
        let raw = store.get(FAVORITES_KEY).expect("list persisted");
        serde_json::from_str(&raw).unwrap()
    }

    fn registry_with(cities: &[&str]) -> FavoritesRegistry<MemoryStore> {
        let mut registry = FavoritesRegistry::load(MemoryStore::new());
        for city in cities {
            registry.add(*city).unwrap();
        }
        registry
    }

    fn persisted(registry: &FavoritesRegistry<MemoryStore>) -> Vec<String> {
        let raw = registry.store.get(FAVORITES_KEY).expect("list persisted");
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn load_defaults_to_empty() {
        let registry = FavoritesRegistry::load(MemoryStore::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn load_treats_malformed_json_as_empty() {
        let mut store = MemoryStore::new();
        store.set(FAVORITES_KEY, "[\"Paris\",".into()).unwrap();

        let registry = FavoritesRegistry::load(store);
        assert!(registry.is_empty());
    }

    #[test]
    fn load_restores_persisted_order() {
        let mut store = MemoryStore::new();
        store
            .set(FAVORITES_KEY, r#"["Tokyo","Paris","Lima"]"#.into())
            .unwrap();

        let registry = FavoritesRegistry::load(store);
        assert_eq!(registry.list(), ["Tokyo", "Paris", "Lima"]);
    }

    #[test]
    fn load_enforces_invariants_on_stored_data() {
        let mut store = MemoryStore::new();
        store
            .set(FAVORITES_KEY, r#"["A","B","A","C","D","E","F"]"#.into())
            .unwrap();

        let registry = FavoritesRegistry::load(store);
        assert_eq!(registry.list(), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn add_appends_and_persists() {
        let registry = registry_with(&["Paris", "London"]);
        assert_eq!(registry.list(), ["Paris", "London"]);
        assert_eq!(persisted(&registry), ["Paris", "London"]);
    }

    #[test]
    fn duplicate_is_rejected_and_list_unchanged() {
        let mut registry = registry_with(&["Paris"]);
        let err = registry.add("Paris").unwrap_err();

        assert!(matches!(err, FavoritesError::DuplicateCity(ref c) if c == "Paris"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn uniqueness_is_case_sensitive() {
        let mut registry = registry_with(&["Paris"]);
        registry.add("paris").unwrap();
        assert_eq!(registry.list(), ["Paris", "paris"]);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut registry = registry_with(&["Paris", "London", "Tokyo", "Cairo", "Lima"]);
        assert!(registry.is_full());

        let err = registry.add("Rome").unwrap_err();
        assert!(matches!(err, FavoritesError::CapacityExceeded { max: 5 }));
        assert_eq!(registry.len(), 5);
        assert_eq!(persisted(&registry).len(), 5);
    }

    #[test]
    fn remove_then_add_keeps_insertion_order() {
        let mut registry = registry_with(&["Paris", "London", "Tokyo", "Cairo", "Lima"]);
        assert!(registry.add("Rome").is_err());

        let removed = registry.remove(4, |city| city == "Lima").unwrap();
        assert_eq!(removed.as_deref(), Some("Lima"));

        registry.add("Rome").unwrap();
        assert_eq!(registry.list(), ["Paris", "London", "Tokyo", "Cairo", "Rome"]);
        assert_eq!(persisted(&registry), ["Paris", "London", "Tokyo", "Cairo", "Rome"]);
    }

    #[test]
    fn declined_confirmation_keeps_entry() {
        let mut registry = registry_with(&["Paris", "London"]);
        let removed = registry.remove(0, |_| false).unwrap();

        assert_eq!(removed, None);
        assert_eq!(registry.list(), ["Paris", "London"]);
    }

    #[test]
    fn remove_out_of_range_does_not_ask() {
        let mut registry = registry_with(&["Paris"]);
        let err = registry
            .remove(3, |_| panic!("confirmation requested for missing entry"))
            .unwrap_err();
        assert!(matches!(err, FavoritesError::IndexOutOfRange(3)));
    }

    #[test]
    fn remove_persists_immediately() {
        let mut registry = registry_with(&["Paris", "London", "Tokyo"]);
        registry.remove(1, |_| true).unwrap();

        assert_eq!(persisted(&registry), ["Paris", "Tokyo"]);

        let reloaded = FavoritesRegistry::load(registry.store.clone());
        assert_eq!(reloaded.list(), ["Paris", "Tokyo"]);
    }

    #[test]
    fn declined_removal_writes_nothing() {
        let mut registry = flaky_registry_with(&["Paris", "London"]);
        assert_eq!(registry.remove(0, |_| false).unwrap(), None);
        assert_eq!(stored(&registry.store), ["Paris", "London"]);
    }

    #[test]
    fn failed_write_rolls_back_add() {
        let mut registry = flaky_registry_with(&["Paris"]);

        let err = registry.add("Lima").unwrap_err();
        assert!(matches!(err, FavoritesError::Storage(StoreError::Io { .. })));
        assert_eq!(registry.list(), ["Paris"]);
        assert_eq!(stored(&registry.store), ["Paris"]);
    }

    #[test]
    fn failed_write_rolls_back_remove() {
        let mut registry = flaky_registry_with(&["Paris", "London", "Tokyo"]);

        let err = registry.remove(1, |_| true).unwrap_err();
        assert!(matches!(err, FavoritesError::Storage(_)));
        assert_eq!(registry.list(), ["Paris", "London", "Tokyo"]);
        assert_eq!(stored(&registry.store), ["Paris", "London", "Tokyo"]);
    }
}
