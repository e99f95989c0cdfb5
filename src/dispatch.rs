//! In-flight command registry: routes inbound URLs to pending commands
//! and owns the exactly-once and deadline policy.
//!
//! The codec in [`crate::wire`] is stateless; this table is where a
//! command's single-shot guarantee lives. Resolution removes the entry,
//! so a duplicated or replayed callback finds nothing to resolve. The OS
//! may deliver a callback more than once; that is harmless here.

use std::time::Instant;

use url::Url;

use crate::error::SdkError;
use crate::shared::{CommandName, RequestId};
use crate::wire::{self, CallbackOutcome};

/// Single-shot sink receiving a command's final outcome.
pub type OutcomeSink = Box<dyn FnOnce(Result<Vec<u8>, SdkError>) + Send>;

struct Pending {
    name: CommandName,
    request: RequestId,
    deadline: Option<Instant>,
    sink: Option<OutcomeSink>,
}

impl Pending {
    fn resolve(mut self, outcome: Result<Vec<u8>, SdkError>) {
        if let Some(sink) = self.sink.take() {
            sink(outcome);
        }
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        // Entries dropped with the table (host tore the client down)
        // still owe their sink a final outcome.
        if let Some(sink) = self.sink.take() {
            sink(Err(SdkError::Cancelled));
        }
    }
}

/// Table of commands that have been emitted and are awaiting a callback.
#[derive(Default)]
pub struct Dispatcher {
    inflight: Vec<Pending>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a command into the awaiting-callback state.
    pub fn register(
        &mut self,
        name: CommandName,
        request: RequestId,
        deadline: Option<Instant>,
        sink: OutcomeSink,
    ) {
        tracing::debug!(command = name.as_str(), %request, "command in flight");
        self.inflight.push(Pending {
            name,
            request,
            deadline,
            sink: Some(sink),
        });
    }

    /// Commands still awaiting a callback.
    pub fn pending(&self) -> usize {
        self.inflight.len()
    }

    /// Whether a given request is still awaiting its callback.
    pub fn is_pending(&self, request: &RequestId) -> bool {
        self.inflight.iter().any(|p| p.request == *request)
    }

    /// Route an inbound URL delivered by the OS.
    ///
    /// Returns `true` when the URL resolved a pending command. Unrelated
    /// and malformed URLs return `false` and resolve nothing, which also
    /// covers a second delivery of an already-consumed callback.
    pub fn handle_url(&mut self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(%err, "ignoring unparseable callback URL");
                return false;
            }
        };

        let matched = self.inflight.iter().enumerate().find_map(|(index, p)| {
            wire::decode(&parsed, &p.name, &p.request).map(|outcome| (index, outcome))
        });
        let Some((index, outcome)) = matched else {
            tracing::debug!(url, "callback matched no in-flight command");
            return false;
        };

        let pending = self.inflight.swap_remove(index);
        match outcome {
            CallbackOutcome::Success(bytes) => {
                tracing::debug!(
                    command = pending.name.as_str(),
                    request = %pending.request,
                    "command resolved with success"
                );
                pending.resolve(Ok(bytes));
            }
            CallbackOutcome::Failure(error) => {
                tracing::debug!(
                    command = pending.name.as_str(),
                    request = %pending.request,
                    %error,
                    "command resolved with wallet error"
                );
                pending.resolve(Err(SdkError::Wallet(error)));
            }
        }
        true
    }

    /// Resolve every command whose deadline has passed with
    /// [`SdkError::Timeout`]. Returns how many were timed out.
    ///
    /// The protocol itself has no timeout; hosts decide the sweep cadence.
    pub fn expire_overdue(&mut self, now: Instant) -> usize {
        let mut expired = 0;
        let mut index = 0;
        while index < self.inflight.len() {
            let overdue = self.inflight[index]
                .deadline
                .is_some_and(|deadline| deadline <= now);
            if overdue {
                let pending = self.inflight.swap_remove(index);
                tracing::warn!(
                    command = pending.name.as_str(),
                    request = %pending.request,
                    "command timed out waiting for wallet callback"
                );
                pending.resolve(Err(SdkError::Timeout));
                expired += 1;
            } else {
                index += 1;
            }
        }
        expired
    }

    /// Abandon a pending command; its sink fires with
    /// [`SdkError::Cancelled`]. Returns `false` if the command was not
    /// pending (already resolved, or never registered).
    pub fn cancel(&mut self, request: &RequestId) -> bool {
        match self.inflight.iter().position(|p| p.request == *request) {
            Some(index) => {
                let pending = self.inflight.swap_remove(index);
                pending.resolve(Err(SdkError::Cancelled));
                true
            }
            None => false,
        }
    }

    /// Remove a command without firing its sink.
    ///
    /// Used when emission fails after registration: the command never
    /// reached the wallet, so the caller surfaces the error directly.
    pub(crate) fn withdraw(&mut self, request: &RequestId) -> bool {
        match self.inflight.iter().position(|p| p.request == *request) {
            Some(index) => {
                let mut pending = self.inflight.swap_remove(index);
                pending.sink.take();
                true
            }
            None => false,
        }
    }
}
