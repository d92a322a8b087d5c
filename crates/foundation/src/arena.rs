use std::ops::{Index, IndexMut};

use crate::handles::Handle;

/// Append-only arena. Items are never removed, so handles stay valid for the
/// lifetime of the arena.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            items: Vec::with_capacity(capacity),
        }
    }

    /// # Panics
    ///
    /// Panics once the arena already holds `u32::MAX + 1` items; handles are
    /// 32-bit. Callers bound their input below that before allocating.
    pub fn alloc(&mut self, v: T) -> Handle {
        let handle =
            Handle::from_index(self.items.len()).expect("arena exceeds u32 handle space");
        self.items.push(v);
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.items.get(handle.index() as usize)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.items.get_mut(handle.index() as usize)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates items in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, v)| (Handle::new(idx as u32), v))
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &T {
        &self.items[handle.index() as usize]
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        &mut self.items[handle.index() as usize]
    }
}
