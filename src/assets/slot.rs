use std::sync::Arc;

use crate::assets::decode::PreparedImage;

/// Ticket handed out when an image load starts; completions must present it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Generation number carried by this ticket.
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Current content of an [`ImageSlot`].
#[derive(Clone, Debug, Default)]
pub enum SlotState {
    /// No image selected.
    #[default]
    Empty,
    /// A load was started and has not completed.
    Pending,
    /// The latest load succeeded.
    Ready(Arc<PreparedImage>),
    /// The latest load failed; the renderer falls back to the solid background.
    Failed(String),
}

/// Result of delivering a load completion to a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The completion belonged to the latest load and was stored.
    Committed,
    /// A newer load (or a clear) superseded this one; the result was dropped.
    Stale,
}

/// Holder for an asynchronously loaded image (background photo or logo).
///
/// Every [`begin`](Self::begin) bumps a generation counter. A completion carrying an older ticket
/// is dropped, so a slow upload can never overwrite a newer selection.
#[derive(Clone, Debug, Default)]
pub struct ImageSlot {
    generation: u64,
    state: SlotState,
}

impl ImageSlot {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load and return its ticket.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation = self.generation.wrapping_add(1);
        self.state = SlotState::Pending;
        LoadTicket(self.generation)
    }

    /// Deliver a load result.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<PreparedImage, String>,
    ) -> LoadOutcome {
        if ticket.0 != self.generation || !matches!(self.state, SlotState::Pending) {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "dropping stale image load"
            );
            return LoadOutcome::Stale;
        }
        self.state = match result {
            Ok(img) => SlotState::Ready(Arc::new(img)),
            Err(msg) => {
                tracing::warn!(error = %msg, "image load failed, keeping solid background");
                SlotState::Failed(msg)
            }
        };
        LoadOutcome::Committed
    }

    /// Mark a new selection whose load has not started; a later [`begin`](Self::begin) takes
    /// over. Loads still in flight become stale.
    pub fn mark_pending(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state = SlotState::Pending;
    }

    /// Remove the image. Loads still in flight become stale.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state = SlotState::Empty;
    }

    /// Current state.
    pub fn state(&self) -> &SlotState {
        &self.state
    }

    /// Image ready to draw, if any.
    pub fn image(&self) -> Option<&Arc<PreparedImage>> {
        match &self.state {
            SlotState::Ready(img) => Some(img),
            _ => None,
        }
    }

    /// Whether an image is selected, loaded or not.
    pub fn is_selected(&self) -> bool {
        !matches!(self.state, SlotState::Empty)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/slot.rs"]
mod tests;
