//! Collaborator seams: wallet discovery and OS URL opening.
//!
//! The SDK never inspects the system itself. The host injects what it
//! knows (which wallet is installed, how to hand a URL to the OS)
//! through these traits, which keeps the core testable and platform-free.

use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::shared::Scheme;

/// An installed wallet app reachable over a URL scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletApp {
    /// Scheme under which the wallet receives command requests.
    pub scheme: Scheme,
}

impl WalletApp {
    pub fn new(scheme: Scheme) -> Self {
        Self { scheme }
    }
}

/// Reports whether a compatible wallet app is installed.
pub trait WalletDirectory {
    /// The wallet to target, or `None` when the host should fall back to
    /// its install prompt.
    fn installed_wallet(&self) -> Option<WalletApp>;
}

/// Directory with a fixed answer, for hosts that resolve availability up
/// front (and for tests).
#[derive(Debug, Clone, Default)]
pub struct FixedDirectory {
    wallet: Option<WalletApp>,
}

impl FixedDirectory {
    pub fn installed(wallet: WalletApp) -> Self {
        Self {
            wallet: Some(wallet),
        }
    }

    pub fn absent() -> Self {
        Self { wallet: None }
    }
}

impl WalletDirectory for FixedDirectory {
    fn installed_wallet(&self) -> Option<WalletApp> {
        self.wallet.clone()
    }
}

/// Hands a request URL to the OS.
///
/// Opening transfers control to the wallet app; the SDK resumes when the
/// OS delivers the callback URL to
/// [`HandoffClient::handle_open_url`](crate::client::HandoffClient::handle_open_url).
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<(), SdkError>;
}
