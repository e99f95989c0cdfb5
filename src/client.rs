//! High-level client: configuration, the sign-message entry point, and
//! the OS deep-link hand-off.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::app::{UrlOpener, WalletDirectory};
use crate::command::{Command, SignMessage};
use crate::dispatch::Dispatcher;
use crate::error::SdkError;
use crate::shared::{Address, RequestId, Scheme};
use crate::wire;

/// The primary entry point for the handoff SDK.
///
/// One client serves a whole host application. Commands from any thread
/// share the in-flight table, and the OS URL entry point may run on a
/// different thread than the requester, so the table sits behind a lock.
pub struct HandoffClient {
    callback_scheme: Scheme,
    directory: Box<dyn WalletDirectory + Send + Sync>,
    opener: Box<dyn UrlOpener + Send + Sync>,
    dispatcher: Arc<Mutex<Dispatcher>>,
    deadline: Option<Duration>,
}

impl HandoffClient {
    pub fn builder() -> HandoffClientBuilder {
        HandoffClientBuilder::default()
    }

    /// Ask the installed wallet to sign `message`.
    ///
    /// `sink` fires exactly once with the final outcome: the signature
    /// bytes, a wallet error, `Timeout` if a deadline is configured and
    /// [`expire_overdue`](Self::expire_overdue) sweeps this command, or
    /// `Cancelled` if the command is abandoned.
    ///
    /// Returns the correlation token of the emitted request. On error
    /// (no wallet installed, OS refused the URL) nothing was emitted and
    /// the sink is never invoked.
    pub fn sign_message(
        &self,
        message: impl Into<Vec<u8>>,
        address: Option<Address>,
        sink: impl FnOnce(Result<Vec<u8>, SdkError>) + Send + 'static,
    ) -> Result<RequestId, SdkError> {
        let mut command = SignMessage::new(message);
        if let Some(address) = address {
            command = command.with_address(address);
        }
        self.execute(command, sink)
    }

    /// Emit any [`Command`] and register it for callback routing.
    pub fn execute<C>(
        &self,
        command: C,
        sink: impl FnOnce(Result<C::Output, SdkError>) + Send + 'static,
    ) -> Result<RequestId, SdkError>
    where
        C: Command + Send + 'static,
    {
        let wallet = self
            .directory
            .installed_wallet()
            .ok_or(SdkError::WalletUnavailable)?;

        let name = command.name();
        let request = RequestId::generate();
        let callback = wire::callback_url(&self.callback_scheme, &name, &request);
        let url = wire::request_url(&wallet.scheme, &name, &command.request_params(), &callback);
        let deadline = self.deadline.map(|timeout| Instant::now() + timeout);

        // The command moves into the erased sink so the raw payload can be
        // decoded into the command's own output type on resolution.
        let erased = Box::new(move |outcome: Result<Vec<u8>, SdkError>| {
            sink(outcome.map(|bytes| command.decode_output(bytes)));
        });
        self.inflight().register(name.clone(), request, deadline, erased);

        if let Err(err) = self.opener.open(&url) {
            // Never reached the wallet: withdraw silently and surface the
            // error to the caller instead of the sink.
            self.inflight().withdraw(&request);
            return Err(err);
        }
        tracing::debug!(command = name.as_str(), %request, "opened wallet request");
        Ok(request)
    }

    /// OS deep-link entry point.
    ///
    /// Returns `true` when `url` resolved a pending command; unrelated
    /// and malformed URLs return `false` and change nothing, so the host
    /// can safely feed every inbound URL through here.
    pub fn handle_open_url(&self, url: &str) -> bool {
        self.inflight().handle_url(url)
    }

    /// Sweep deadlines; overdue commands resolve with [`SdkError::Timeout`].
    /// Returns how many commands were timed out.
    pub fn expire_overdue(&self) -> usize {
        self.inflight().expire_overdue(Instant::now())
    }

    /// Abandon a pending command; its sink fires with [`SdkError::Cancelled`].
    pub fn cancel(&self, request: &RequestId) -> bool {
        self.inflight().cancel(request)
    }

    /// Commands currently awaiting a wallet callback.
    pub fn pending(&self) -> usize {
        self.inflight().pending()
    }

    fn inflight(&self) -> MutexGuard<'_, Dispatcher> {
        self.dispatcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(feature = "async")]
impl HandoffClient {
    /// [`sign_message`](Self::sign_message) adapted to a oneshot future.
    ///
    /// Resolution still arrives through [`handle_open_url`](Self::handle_open_url)
    /// (or a deadline sweep); this only adapts the single-shot sink to an
    /// awaitable channel.
    pub async fn sign_message_async(
        &self,
        message: impl Into<Vec<u8>>,
        address: Option<Address>,
    ) -> Result<Vec<u8>, SdkError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sign_message(message, address, move |outcome| {
            let _ = tx.send(outcome);
        })?;
        rx.await.unwrap_or(Err(SdkError::Cancelled))
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct HandoffClientBuilder {
    callback_scheme: Option<Scheme>,
    directory: Option<Box<dyn WalletDirectory + Send + Sync>>,
    opener: Option<Box<dyn UrlOpener + Send + Sync>>,
    deadline: Option<Duration>,
}

impl HandoffClientBuilder {
    /// Scheme the host registered with the OS to receive callbacks.
    pub fn callback_scheme(mut self, scheme: Scheme) -> Self {
        self.callback_scheme = Some(scheme);
        self
    }

    pub fn directory(mut self, directory: impl WalletDirectory + Send + Sync + 'static) -> Self {
        self.directory = Some(Box::new(directory));
        self
    }

    pub fn opener(mut self, opener: impl UrlOpener + Send + Sync + 'static) -> Self {
        self.opener = Some(Box::new(opener));
        self
    }

    /// Deadline applied to every command; overdue commands resolve with
    /// `Timeout` on the next [`HandoffClient::expire_overdue`] sweep.
    /// Without one, commands wait for their callback indefinitely.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn build(self) -> Result<HandoffClient, SdkError> {
        Ok(HandoffClient {
            callback_scheme: self
                .callback_scheme
                .ok_or_else(|| SdkError::Config("callback_scheme is required".into()))?,
            directory: self
                .directory
                .ok_or_else(|| SdkError::Config("directory is required".into()))?,
            opener: self
                .opener
                .ok_or_else(|| SdkError::Config("opener is required".into()))?,
            dispatcher: Arc::new(Mutex::new(Dispatcher::new())),
            deadline: self.deadline,
        })
    }
}
