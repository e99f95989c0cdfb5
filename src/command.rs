//! Command types: the shape every handoff command shares, and the
//! sign-message command itself.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::shared::{Address, CommandName};
use crate::wire::{ADDRESS_PARAM, MESSAGE_PARAM};

/// Name of the sign-message command, the URL host on both legs.
pub const SIGN_MESSAGE: &str = "sign-message";

/// A single request/response exchange the wallet app knows how to serve.
///
/// Implementations describe their request query parameters and how to
/// interpret the raw success payload; the wire codec and the dispatcher
/// handle the rest, so a new command type is just an impl of this trait.
pub trait Command {
    /// Decoded success payload.
    type Output;

    /// Well-known command name; routes callbacks back to this command.
    fn name(&self) -> CommandName;

    /// Query parameters for the request leg, excluding `callback`, in
    /// emission order.
    fn request_params(&self) -> Vec<(&'static str, String)>;

    /// Interpret the base64-decoded `result` payload.
    fn decode_output(&self, bytes: Vec<u8>) -> Self::Output;
}

/// Ask the wallet to sign an arbitrary message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignMessage {
    /// Message bytes to sign. Immutable once the command is built.
    message: Vec<u8>,
    /// Which address should sign; `None` lets the wallet choose.
    address: Option<Address>,
}

impl SignMessage {
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Self {
            message: message.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<Address>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }
}

impl Command for SignMessage {
    /// Raw signature bytes produced by the wallet.
    type Output = Vec<u8>;

    fn name(&self) -> CommandName {
        CommandName::from(SIGN_MESSAGE)
    }

    fn request_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![(MESSAGE_PARAM, BASE64.encode(&self.message))];
        if let Some(address) = &self.address {
            params.push((ADDRESS_PARAM, address.to_string()));
        }
        params
    }

    fn decode_output(&self, bytes: Vec<u8>) -> Vec<u8> {
        bytes
    }
}
