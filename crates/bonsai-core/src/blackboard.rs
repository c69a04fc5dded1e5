use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use parking_lot::RwLock;

type Value = Box<dyn Any + Send + Sync>;

/// Typed handle for a blackboard entry.
///
/// Keys are plain strings underneath; the phantom type only spares call sites from repeating the
/// value type. Two handles with the same name but different types address the same slot, and the
/// usual "mismatch reads as absent" rule applies.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

impl<T> BbKey<T>
where
    T: Send + Sync + 'static,
{
    pub fn set(self, blackboard: &Blackboard, value: T) {
        blackboard.set(self.name, value);
    }

    pub fn has(self, blackboard: &Blackboard) -> bool {
        blackboard.with(self.name, |_: &T| ()).is_some()
    }

    pub fn remove(self, blackboard: &Blackboard) -> bool {
        blackboard.remove(self.name)
    }

    pub fn update(self, blackboard: &Blackboard, f: impl FnOnce(&mut T)) -> bool {
        blackboard.update(self.name, f)
    }
}

impl<T> BbKey<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn get(self, blackboard: &Blackboard) -> Option<T> {
        blackboard.get(self.name)
    }

    pub fn get_or(self, blackboard: &Blackboard, default: T) -> T {
        blackboard.get_or(self.name, default)
    }
}

/// Shared, heterogeneously-typed key/value store.
///
/// Every operation takes `&self` and is atomic with respect to every other operation on the same
/// blackboard. A sequence of operations is not: another thread may write between a `get` and the
/// following `set`. Use [`Blackboard::update`] when a read-modify-write has to be indivisible.
///
/// A key holds at most one value, of one concrete type. Reading it back as any other type is
/// indistinguishable from reading an absent key.
#[derive(Default)]
pub struct Blackboard {
    values: RwLock<HashMap<String, Value>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value under `key`, whatever type was stored before.
    pub fn set<T>(&self, key: impl Into<String>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.values.write().insert(key.into(), Box::new(value));
    }

    /// Clone out the value under `key`.
    ///
    /// Returns `None` when the key is absent or holds a value of a different type.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.with(key, T::clone)
    }

    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: Clone + Send + Sync + 'static,
    {
        self.get(key).unwrap_or(default)
    }

    /// Borrow the value under `key` for the duration of `f`.
    ///
    /// `f` runs while the store is read-locked and must not call back into this blackboard.
    pub fn with<T, R>(&self, key: &str, f: impl FnOnce(&T) -> R) -> Option<R>
    where
        T: Send + Sync + 'static,
    {
        let values = self.values.read();
        let value = values.get(key)?.downcast_ref::<T>()?;
        Some(f(value))
    }

    /// Mutate an existing value of type `T` in place.
    ///
    /// Returns `false` (without calling `f`) when the key is absent or holds another type. `f` runs
    /// under the write lock and must not call back into this blackboard.
    pub fn update<T>(&self, key: &str, f: impl FnOnce(&mut T)) -> bool
    where
        T: Send + Sync + 'static,
    {
        let mut values = self.values.write();
        match values.get_mut(key).and_then(|v| v.downcast_mut::<T>()) {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Drop the value under `key`. Returns whether anything was stored.
    pub fn remove(&self, key: &str) -> bool {
        self.values.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Snapshot of the stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.keys();
        keys.sort_unstable();
        f.debug_struct("Blackboard").field("keys", &keys).finish()
    }
}
