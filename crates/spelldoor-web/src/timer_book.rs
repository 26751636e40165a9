#![forbid(unsafe_code)]

//! Bookkeeping for the shell's `setTimeout` handles.
//!
//! Fade timers are keyed by the core's [`TimerToken`]; reveal timers get a
//! local id so the callback can remove its own handle when it fires. Once
//! detached, the book hands back every live handle for cancellation and
//! refuses late work.

use std::collections::HashMap;

use spelldoor_core::TimerToken;

/// Identifier of a scheduled reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealId(u64);

#[derive(Debug)]
pub struct TimerBook<H> {
    fade: HashMap<TimerToken, H>,
    reveal: HashMap<RevealId, H>,
    next_reveal: u64,
    attached: bool,
}

impl<H> Default for TimerBook<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> TimerBook<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fade: HashMap::new(),
            reveal: HashMap::new(),
            next_reveal: 0,
            attached: true,
        }
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn track_fade(&mut self, token: TimerToken, handle: H) {
        self.fade.insert(token, handle);
    }

    /// Forget a fade timer, returning its handle if it was still live.
    pub fn take_fade(&mut self, token: TimerToken) -> Option<H> {
        self.fade.remove(&token)
    }

    /// Allocate the id a reveal callback will report back with.
    pub fn reserve_reveal(&mut self) -> RevealId {
        let id = RevealId(self.next_reveal);
        self.next_reveal = self.next_reveal.wrapping_add(1);
        id
    }

    pub fn track_reveal(&mut self, id: RevealId, handle: H) {
        if self.attached {
            self.reveal.insert(id, handle);
        }
    }

    /// Drop the handle of a fired reveal. Returns whether the reveal should
    /// still be applied.
    pub fn reveal_fired(&mut self, id: RevealId) -> bool {
        self.reveal.remove(&id);
        self.attached
    }

    /// Number of handles still waiting to fire.
    #[must_use]
    pub fn live(&self) -> usize {
        self.fade.len() + self.reveal.len()
    }

    /// Mark the book detached and return every live handle for cancellation.
    pub fn detach(&mut self) -> Vec<H> {
        self.attached = false;
        self.fade
            .drain()
            .map(|(_, handle)| handle)
            .chain(self.reveal.drain().map(|(_, handle)| handle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spelldoor_core::{DisplayEffect, FadeLifecycle, KeyLabel};
    use std::time::Duration;

    fn scheduled_token(effects: &[DisplayEffect]) -> TimerToken {
        effects
            .iter()
            .find_map(|effect| match effect {
                DisplayEffect::ScheduleTimer(request) => Some(request.token),
                _ => None,
            })
            .expect("timer scheduled")
    }

    #[test]
    fn fired_reveals_release_their_handles() {
        let mut book = TimerBook::new();
        for handle in 0..3 {
            let id = book.reserve_reveal();
            book.track_reveal(id, handle);
            assert!(book.reveal_fired(id));
        }
        assert_eq!(book.live(), 0);
    }

    #[test]
    fn reveal_ids_are_distinct() {
        let mut book = TimerBook::<i32>::new();
        let a = book.reserve_reveal();
        let b = book.reserve_reveal();
        assert_ne!(a, b);
    }

    #[test]
    fn detach_cancels_everything_and_blocks_late_reveals() {
        let mut book = TimerBook::new();
        let mut fade = FadeLifecycle::new(Duration::from_millis(500), Duration::from_secs(3));
        let token = scheduled_token(&fade.show(&KeyLabel::from_dom("f").expect("label")));
        book.track_fade(token, 7);
        let pending = book.reserve_reveal();
        book.track_reveal(pending, 8);

        let mut cancelled = book.detach();
        cancelled.sort_unstable();
        assert_eq!(cancelled, vec![7, 8]);
        assert!(!book.is_attached());
        assert!(!book.reveal_fired(pending));

        // A response resolved after detach must not leave a handle behind.
        let late = book.reserve_reveal();
        book.track_reveal(late, 9);
        assert_eq!(book.live(), 0);
    }

    #[test]
    fn superseded_fade_is_taken_once() {
        let mut book = TimerBook::new();
        let mut fade = FadeLifecycle::new(Duration::from_millis(500), Duration::from_secs(3));
        let token = scheduled_token(&fade.show(&KeyLabel::from_dom("a").expect("label")));
        book.track_fade(token, 1);
        assert_eq!(book.take_fade(token), Some(1));
        assert_eq!(book.take_fade(token), None);
    }
}
