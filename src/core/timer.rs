/// Auto-continue timer — at most one pending, cancellable continuation.

use serde::Serialize;
use std::time::Duration;

use crate::schema::dialog::DialogId;

/// A scheduled auto-continue. It is only honoured while `dialog_id` is
/// still the current dialog and `ticket` is still the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoContinue {
    pub dialog_id: DialogId,
    pub ticket: u64,
    /// Engine clock time at which the continuation is due.
    #[serde(serialize_with = "serialize_millis")]
    pub due_at: Duration,
}

fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(value.as_millis() as u64)
}

/// Single-slot scheduler. Scheduling replaces whatever was pending.
#[derive(Debug, Clone)]
pub struct AutoContinueTimer {
    delay: Duration,
    pending: Option<AutoContinue>,
    next_ticket: u64,
}

impl AutoContinueTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_ticket: 1,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, dialog_id: DialogId, now: Duration) -> AutoContinue {
        let scheduled = AutoContinue {
            dialog_id,
            ticket: self.next_ticket,
            due_at: now.saturating_add(self.delay),
        };
        self.next_ticket += 1;
        self.pending = Some(scheduled);
        scheduled
    }

    pub fn cancel(&mut self) -> Option<AutoContinue> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<AutoContinue> {
        self.pending
    }

    /// The pending timer if it is due at or before `now`, without removing it.
    pub fn due_by(&self, now: Duration) -> Option<AutoContinue> {
        self.pending.filter(|p| p.due_at <= now)
    }

    /// Remove and return the pending timer if it carries `ticket`.
    pub fn claim(&mut self, ticket: u64) -> Option<AutoContinue> {
        match self.pending {
            Some(p) if p.ticket == ticket => self.pending.take(),
            _ => None,
        }
    }
}
