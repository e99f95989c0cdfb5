//! Unified SDK error types and the wallet wire-error taxonomy.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The wallet resolved the command with a protocol error code.
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// No compatible wallet app is installed. The host should fall back
    /// to its install prompt; nothing was emitted.
    #[error("no wallet app is installed")]
    WalletUnavailable,

    #[error("invalid URL scheme: {0:?}")]
    InvalidScheme(String),

    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The OS refused or failed to open the request URL.
    #[error("failed to open request URL: {0}")]
    OpenUrl(String),

    /// The command's deadline passed without a callback.
    #[error("timed out waiting for the wallet callback")]
    Timeout,

    /// The command was dropped before any callback arrived.
    #[error("command was cancelled before a callback arrived")]
    Cancelled,
}

/// Error codes shared with the wallet app, exchanged as the integer value
/// of the `error` query parameter on the callback URL.
///
/// Unknown integers deliberately do not map to a variant: a callback
/// carrying one is treated as unmatched rather than resolved (see
/// [`crate::wire`]).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletError {
    /// The user declined to authorize the operation in the wallet app.
    #[error("user declined the request")]
    RequestDenied,

    /// The wallet could not parse or validate the incoming request.
    #[error("wallet rejected the request as invalid")]
    InvalidRequest,

    /// The installed wallet does not understand this command.
    #[error("command not supported by the installed wallet")]
    UnsupportedCommand,

    /// The wallet failed while producing the signature.
    #[error("wallet failed to sign")]
    SignFailed,
}

impl WalletError {
    /// Stable integer code used on the wire.
    pub fn code(&self) -> i64 {
        match self {
            WalletError::RequestDenied => 1,
            WalletError::InvalidRequest => 2,
            WalletError::UnsupportedCommand => 3,
            WalletError::SignFailed => 4,
        }
    }

    /// Map a wire code back to a known error. Unknown codes return `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(WalletError::RequestDenied),
            2 => Some(WalletError::InvalidRequest),
            3 => Some(WalletError::UnsupportedCommand),
            4 => Some(WalletError::SignFailed),
            _ => None,
        }
    }
}

impl Serialize for WalletError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for WalletError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = i64::deserialize(deserializer)?;
        WalletError::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown wallet error code {code}")))
    }
}
