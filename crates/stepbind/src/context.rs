//! Per-scenario state shared by bindings.
//!
//! `InvocationContext` is a type-indexed map: each type has at most one
//! slot. Step bodies use it to hand values to later steps of the same
//! scenario, and hooks use it to prepare or tear down shared state.

use std::any::{Any, TypeId};

use hashbrown::HashMap;

/// Type-indexed storage passed mutably to every binding invocation.
///
/// # Examples
///
/// ```
/// use stepbind::InvocationContext;
///
/// let mut ctx = InvocationContext::default();
/// ctx.insert(41_u32);
/// if let Some(total) = ctx.get_mut::<u32>() {
///     *total += 1;
/// }
/// assert_eq!(ctx.get::<u32>(), Some(&42));
/// ```
#[derive(Default)]
pub struct InvocationContext {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl InvocationContext {
    /// Store `value`, returning the previous value of the same type.
    pub fn insert<T: Any>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Borrow the stored `T`.
    #[must_use]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.values.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Mutably borrow the stored `T`.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.values.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// Remove and return the stored `T`.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Returns `true` when a `T` is stored.
    #[must_use]
    pub fn contains<T: Any>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("len", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_slot_per_type() {
        let mut ctx = InvocationContext::default();
        assert_eq!(ctx.insert(String::from("first")), None);
        assert_eq!(ctx.insert(String::from("second")), Some(String::from("first")));
        ctx.insert(7_i32);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.remove::<String>(), Some(String::from("second")));
        assert!(!ctx.contains::<String>());
        assert!(ctx.contains::<i32>());
    }
}
