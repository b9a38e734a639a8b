use std::time::{Duration, Instant};

use tubementor_core::{Notice, Notices};

pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Notices on screen, each with the moment it appeared.
#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<(Notice, Instant)>,
}

impl Toasts {
    pub fn absorb(&mut self, notices: &mut Notices, now: Instant) {
        self.items
            .extend(notices.drain().into_iter().map(|notice| (notice, now)));
    }

    pub fn push(&mut self, notice: Notice, now: Instant) {
        self.items.push((notice, now));
    }

    pub fn expire(&mut self, now: Instant) {
        self.items
            .retain(|(_, shown)| now.saturating_duration_since(*shown) < TOAST_TTL);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter().map(|(notice, _)| notice)
    }
}
