use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(3);

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Neutral information.
    Info,
    /// A command succeeded.
    Success,
    /// A command failed; state was left unchanged.
    Error,
}

/// Transient user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Message text.
    pub message: String,
    /// When the notice stops being shown.
    pub expires_at: Instant,
}

/// Queue of posted notices.
#[derive(Clone, Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a notice expiring [`NOTICE_LIFETIME`] from now.
    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NoticeKind::Error => tracing::warn!(%message, "notice"),
            _ => tracing::info!(%message, "notice"),
        }
        self.notices.push(Notice {
            kind,
            message,
            expires_at: Instant::now() + NOTICE_LIFETIME,
        });
    }

    /// Post an [`NoticeKind::Info`] notice.
    pub fn info(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Info, message);
    }

    /// Post a [`NoticeKind::Success`] notice.
    pub fn success(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Success, message);
    }

    /// Post a [`NoticeKind::Error`] notice.
    pub fn error(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Error, message);
    }

    /// Notices still visible at `now`.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| n.expires_at > now)
    }

    /// Drop notices expired at `now`.
    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| n.expires_at > now);
    }

    /// Take every queued notice, expired or not.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
