/// Index handle into an [`Arena`](crate::arena::Arena).
///
/// Handles are only meaningful for the arena that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32);

impl Handle {
    pub fn new(index: u32) -> Self {
        Handle(index)
    }

    /// Handle for a `usize` position, or `None` past `u32::MAX`.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Handle)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn handles_order_by_index() {
        assert!(Handle::new(1) < Handle::new(2));
        assert_eq!(Handle::new(7).index(), 7);
    }

    #[test]
    fn from_index_rejects_positions_past_u32() {
        assert_eq!(Handle::from_index(5), Some(Handle::new(5)));
        assert_eq!(
            Handle::from_index(u32::MAX as usize),
            Some(Handle::new(u32::MAX))
        );
        assert_eq!(Handle::from_index(u32::MAX as usize + 1), None);
    }
}
