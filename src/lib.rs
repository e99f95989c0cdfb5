//! # wallet-handoff
//!
//! Rust SDK for delegating signing operations to a companion wallet app
//! via URL-scheme deep links.
//!
//! The host cannot call the wallet directly: it serializes a command into
//! a URL, hands control to the OS, and later receives a callback URL
//! carrying the outcome. This crate owns that round trip:
//!
//! 1. **Core** — shared newtypes, the wire codec, command types (pure,
//!    synchronous).
//! 2. **Dispatch** — the in-flight table: callback routing, exactly-once
//!    delivery, deadline expiry.
//! 3. **Client** — [`client::HandoffClient`]: configuration, emission,
//!    and the OS deep-link entry point.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use wallet_handoff::prelude::*;
//!
//! let client = HandoffClient::builder()
//!     .callback_scheme(Scheme::new("myapp")?)
//!     .directory(FixedDirectory::installed(WalletApp::new(Scheme::new("trust")?)))
//!     .opener(system_opener)
//!     .build()?;
//!
//! client.sign_message(b"hello".to_vec(), None, |outcome| {
//!     // fires exactly once: Ok(signature) or Err(error)
//! })?;
//!
//! // later, from the host's OS deep-link handler:
//! // client.handle_open_url(&url);
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all layers.
pub mod shared;

/// Command types: the command trait and the sign-message command.
pub mod command;

/// Wire codec: request-URL emission, callback-URL decoding.
pub mod wire;

/// Unified SDK error types and the wallet wire-error taxonomy.
pub mod error;

// ── Layer 2: Dispatch ────────────────────────────────────────────────────────

/// In-flight command registry: routing, exactly-once delivery, deadlines.
pub mod dispatch;

// ── Layer 3: Client ──────────────────────────────────────────────────────────

/// Collaborator seams: wallet discovery and OS URL opening.
pub mod app;

/// `HandoffClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Address, CommandName, RequestId, Scheme};

    // Commands
    pub use crate::command::{Command, SignMessage, SIGN_MESSAGE};

    // Wire codec
    pub use crate::wire::CallbackOutcome;

    // Errors
    pub use crate::error::{SdkError, WalletError};

    // Dispatch
    pub use crate::dispatch::{Dispatcher, OutcomeSink};

    // Collaborator seams
    pub use crate::app::{FixedDirectory, UrlOpener, WalletApp, WalletDirectory};

    // Client
    pub use crate::client::{HandoffClient, HandoffClientBuilder};
}
