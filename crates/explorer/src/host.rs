use sublayers::SublayerId;

/// Callbacks the hosting panel supplies to the explorer.
pub trait ExplorerHost {
    /// Called once per leaf confirmed by a toggle, in depth-first order.
    fn sync_visibility(&mut self, id: SublayerId, visible: bool);

    /// Called when the explorer panel opens (`true`) or closes (`false`).
    fn explorer_toggled(&mut self, _open: bool) {}
}

/// Adapts a plain closure into an [`ExplorerHost`] that only cares about
/// visibility sync.
pub struct SyncFn<F>(pub F);

impl<F> ExplorerHost for SyncFn<F>
where
    F: FnMut(SublayerId, bool),
{
    fn sync_visibility(&mut self, id: SublayerId, visible: bool) {
        (self.0)(id, visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Sync { id: SublayerId, visible: bool },
    Opened,
    Closed,
}

/// Host that records every callback in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synced(&self) -> Vec<(SublayerId, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Sync { id, visible } => Some((*id, *visible)),
                _ => None,
            })
            .collect()
    }

    pub fn drain(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ExplorerHost for RecordingHost {
    fn sync_visibility(&mut self, id: SublayerId, visible: bool) {
        self.events.push(HostEvent::Sync { id, visible });
    }

    fn explorer_toggled(&mut self, open: bool) {
        self.events.push(if open {
            HostEvent::Opened
        } else {
            HostEvent::Closed
        });
    }
}
