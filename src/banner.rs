//! Transient messaging: at most one banner, auto-dismissed after its TTL.
//!
//! Expiry is computed against `tokio::time::Instant`, so a paused test clock
//! drives it deterministically.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

impl BannerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BannerKind::Error => "error",
            BannerKind::Success => "success",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub shown_at: Instant,
    pub ttl: Duration,
}

impl Banner {
    pub fn expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= self.ttl
    }
}

/// The single banner slot.
#[derive(Clone, Debug)]
pub struct BannerSlot {
    current: Option<Banner>,
    error_ttl: Duration,
    success_ttl: Duration,
}

impl BannerSlot {
    pub fn new(error_ttl: Duration, success_ttl: Duration) -> Self {
        Self { current: None, error_ttl, success_ttl }
    }

    pub fn show_error(&mut self, text: impl Into<String>) {
        self.show(BannerKind::Error, text.into(), self.error_ttl);
    }

    pub fn show_success(&mut self, text: impl Into<String>) {
        self.show(BannerKind::Success, text.into(), self.success_ttl);
    }

    fn show(&mut self, kind: BannerKind, text: String, ttl: Duration) {
        // Replacing the slot removes any banner still on screen.
        self.current = Some(Banner { kind, text, shown_at: Instant::now(), ttl });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the banner once its TTL has elapsed. Returns true if one was dismissed.
    pub fn expire(&mut self) -> bool {
        let now = Instant::now();
        match &self.current {
            Some(b) if b.expired_at(now) => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// The banner visible right now, if any.
    pub fn visible(&self) -> Option<&Banner> {
        let now = Instant::now();
        self.current.as_ref().filter(|b| !b.expired_at(now))
    }

    /// When the current banner goes away, for front ends that schedule a redraw.
    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|b| b.shown_at + b.ttl)
    }
}

impl Default for BannerSlot {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn error_lives_five_seconds() {
        let mut slot = BannerSlot::default();
        slot.show_error("Only image files are allowed");
        assert_eq!(slot.deadline(), Some(Instant::now() + Duration::from_secs(5)));
        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert_eq!(slot.visible().map(|b| b.kind), Some(BannerKind::Error));
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(slot.visible().is_none());
        assert!(slot.expire());
        assert!(slot.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn success_lives_three_seconds() {
        let mut slot = BannerSlot::default();
        slot.show_success("Session cleared successfully");
        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert!(slot.visible().is_some());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(slot.visible().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn new_banner_replaces_old_and_restarts_clock() {
        let mut slot = BannerSlot::default();
        slot.show_error("first");
        tokio::time::advance(Duration::from_secs(4)).await;
        slot.show_success("second");
        let b = slot.visible().unwrap();
        assert_eq!(b.kind, BannerKind::Success);
        assert_eq!(b.text, "second");
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(slot.visible().is_some());
        assert!(!slot.expire());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_removes_banner() {
        let mut slot = BannerSlot::default();
        slot.show_error("x");
        slot.clear();
        assert!(slot.visible().is_none());
    }
}
