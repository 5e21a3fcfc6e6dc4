//! One-shot load deadline.
//!
//! The watchdog never touches session state. The host asks it for a due
//! ticket after draining its event queue and hands that ticket back to the
//! controller, which decides whether the timeout still applies.

use std::time::Duration;

/// Identity of one arming. Tickets are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchdogTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    ticket: WatchdogTicket,
    deadline: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Watchdog {
    armed: Option<Armed>,
    next_ticket: u64,
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a deadline `timeout` after `now`, replacing any armed one.
    pub fn arm(&mut self, now: Duration, timeout: Duration) -> WatchdogTicket {
        self.next_ticket += 1;
        let ticket = WatchdogTicket(self.next_ticket);
        self.armed = Some(Armed {
            ticket,
            deadline: now + timeout,
        });
        ticket
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn is_current(&self, ticket: WatchdogTicket) -> bool {
        self.armed.is_some_and(|armed| armed.ticket == ticket)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.armed.map(|armed| armed.deadline)
    }

    /// Returns the armed ticket once its deadline has passed. The arming is
    /// consumed, so a deadline yields at most one ticket.
    pub fn take_due(&mut self, now: Duration) -> Option<WatchdogTicket> {
        match self.armed {
            Some(armed) if now >= armed.deadline => {
                self.armed = None;
                Some(armed.ticket)
            }
            _ => None,
        }
    }
}
