//! Unread contact-message notifier.
//!
//! Polls a [`ContactsSource`] on a fixed interval and keeps a short list of
//! the most recent unread messages for the admin dashboard. Polls never
//! overlap: a tick that fires while the previous fetch is still running is
//! skipped rather than queued.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use shieldline_core::ContactId;

use crate::contacts::{ContactMessage, ContactsError, ContactsSource};

/// Number of messages kept in the recent list.
pub const RECENT_LIMIT: usize = 5;

/// Result of a single poll attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Another poll was still in flight; nothing was fetched.
    Skipped,
    /// The source was queried.
    Polled(PollReport),
}

/// What a completed poll found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// Unread messages reported by the source.
    pub unread: usize,
    /// How far the unread count rose since the previous poll (0 if it fell).
    pub increased_by: usize,
    /// Messages not seen by any earlier poll, newest first.
    pub new_messages: Vec<ContactMessage>,
}

#[derive(Debug, Default)]
struct NotifierState {
    /// Newest first, at most `RECENT_LIMIT` entries.
    recent: VecDeque<ContactMessage>,
    /// Ids returned by the last successful fetch.
    known: HashSet<ContactId>,
    previous_unread: usize,
    /// Increases accumulated since the admin last acknowledged them.
    unseen: usize,
    last_polled_at: Option<DateTime<Utc>>,
}

/// Releases the in-flight flag when a poll finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic unread-message poller.
pub struct UnreadNotifier<S> {
    source: S,
    state: Mutex<NotifierState>,
    in_flight: AtomicBool,
}

impl<S: ContactsSource> UnreadNotifier<S> {
    /// Create a notifier over `source`. Nothing is fetched until the first poll.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(NotifierState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The underlying message source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Whether a poll is currently running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetch unread messages once and fold them into the notifier state.
    ///
    /// Returns [`PollOutcome::Skipped`] without touching the source when a
    /// previous poll has not finished.
    ///
    /// # Errors
    ///
    /// Returns the source's error; the notifier state is left unchanged.
    #[instrument(skip_all)]
    pub async fn poll_once(&self) -> Result<PollOutcome, ContactsError> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            debug!("Previous poll still running, skipping");
            return Ok(PollOutcome::Skipped);
        };

        let fetched = match self.source.fetch_unread().await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, "Unread message poll failed");
                return Err(e);
            }
        };

        Ok(PollOutcome::Polled(self.merge(fetched, Utc::now())))
    }

    /// Acknowledge everything reported so far.
    pub fn mark_seen(&self) {
        self.lock_state().unseen = 0;
    }

    /// The most recent unread messages, newest first.
    #[must_use]
    pub fn recent(&self) -> Vec<ContactMessage> {
        self.lock_state().recent.iter().cloned().collect()
    }

    /// Unread count from the last successful poll.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.lock_state().previous_unread
    }

    /// New messages reported since the last [`mark_seen`](Self::mark_seen).
    #[must_use]
    pub fn unseen_count(&self) -> usize {
        self.lock_state().unseen
    }

    /// When the last successful poll completed.
    #[must_use]
    pub fn last_polled_at(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_polled_at
    }

    fn merge(&self, mut fetched: Vec<ContactMessage>, now: DateTime<Utc>) -> PollReport {
        // Undated messages sort last.
        fetched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut state = self.lock_state();

        let new_messages: Vec<ContactMessage> = fetched
            .iter()
            .filter(|m| !state.known.contains(&m.id) && !state.recent.iter().any(|r| r.id == m.id))
            .cloned()
            .collect();

        for message in new_messages.iter().rev() {
            state.recent.push_front(message.clone());
        }
        state.recent.truncate(RECENT_LIMIT);

        let unread = fetched.len();
        let increased_by = unread.saturating_sub(state.previous_unread);
        state.previous_unread = unread;
        state.unseen = state.unseen.saturating_add(increased_by);
        state.known = fetched.into_iter().map(|m| m.id).collect();
        state.last_polled_at = Some(now);

        PollReport {
            unread,
            increased_by,
            new_messages,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, NotifierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: ContactsSource + 'static> UnreadNotifier<S> {
    /// Poll every `every` until `shutdown` completes.
    ///
    /// Each tick spawns its poll, so a slow fetch never delays the ticker;
    /// ticks that land on a running poll are skipped.
    pub async fn run<F>(self: Arc<Self>, every: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(interval_secs = every.as_secs(), "Unread message notifier started");

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    let notifier = Arc::clone(&self);
                    tokio::spawn(async move {
                        notifier.poll_and_log().await;
                    });
                }
            }
        }

        info!("Unread message notifier stopped");
    }

    async fn poll_and_log(&self) {
        // Failures are already logged by poll_once.
        let Ok(PollOutcome::Polled(report)) = self.poll_once().await else {
            return;
        };

        if report.increased_by == 0 {
            debug!(unread = report.unread, "No new contact messages");
            return;
        }

        info!(
            unread = report.unread,
            increased_by = report.increased_by,
            "New contact messages"
        );
        for message in &report.new_messages {
            info!(
                contact_id = %message.id,
                from = %message.name,
                subject = message.subject.as_deref().unwrap_or(""),
                "Unread contact message"
            );
        }
    }
}
