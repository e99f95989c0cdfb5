//! Wire codec for the handoff protocol: request-URL emission and
//! callback-URL decoding.
//!
//! Both legs share one URL shape: the scheme selects the receiving app,
//! the host is the command name, and the query carries the payload.
//! Query values are form-urlencoded in both directions.
//!
//! Request leg:
//!
//! ```text
//! <wallet-scheme>://sign-message?message=<b64>&address=<addr>&callback=<enc-url>
//! ```
//!
//! Callback leg (the wallet appends `error` or `result` to the callback
//! URL it was handed):
//!
//! ```text
//! <callback-scheme>://sign-message?request=<uuid>&result=<b64>
//! <callback-scheme>://sign-message?request=<uuid>&error=<int>
//! ```
//!
//! Decoding is deliberately conservative: anything malformed (unparseable
//! URL, wrong host, missing or foreign correlation token, unknown error
//! code, invalid base64) reports "not matched" and leaves the command
//! pending. Only a well-formed callback resolves a command.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use url::Url;

use crate::error::WalletError;
use crate::shared::{CommandName, RequestId, Scheme};

/// Request-leg query parameter carrying the base64 message payload.
pub(crate) const MESSAGE_PARAM: &str = "message";
/// Request-leg query parameter carrying the optional signer address.
pub(crate) const ADDRESS_PARAM: &str = "address";
/// Request-leg query parameter carrying the full callback URL.
pub(crate) const CALLBACK_PARAM: &str = "callback";
/// Correlation token parameter, present on both callback-leg directions.
pub(crate) const REQUEST_PARAM: &str = "request";

const ERROR_PARAM: &str = "error";
const RESULT_PARAM: &str = "result";

/// Outcome decoded from a well-formed callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The `result` payload, base64-decoded.
    Success(Vec<u8>),
    /// A recognized wallet error code.
    Failure(WalletError),
}

/// Build the outbound request URL for a command.
///
/// `params` are the command's own query parameters in emission order; the
/// callback URL is appended last under `callback`. Infallible: schemes are
/// validated at construction and command names are well-known hosts.
pub fn request_url(
    wallet_scheme: &Scheme,
    name: &CommandName,
    params: &[(&str, String)],
    callback: &str,
) -> String {
    let mut query = String::new();
    for (key, value) in params {
        push_pair(&mut query, key, value);
    }
    push_pair(&mut query, CALLBACK_PARAM, callback);
    format!("{wallet_scheme}://{name}?{query}")
}

/// Build the callback URL a wallet must invoke to answer a command.
pub fn callback_url(callback_scheme: &Scheme, name: &CommandName, request: &RequestId) -> String {
    format!("{callback_scheme}://{name}?{REQUEST_PARAM}={request}")
}

fn push_pair(query: &mut String, key: &str, value: &str) {
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str(key);
    query.push('=');
    query.push_str(&urlencoding::encode(value));
}

/// Decode an inbound URL against a single in-flight command.
///
/// Returns `None` when the URL is not a well-formed callback for
/// (`name`, `request`); the command stays pending in that case. Note the
/// asymmetry inherited from the protocol: a recognized `error` code is a
/// resolved failure, but an unrecognized or unparseable one is treated
/// the same as any other malformed callback and matches nothing.
pub fn decode(url: &Url, name: &CommandName, request: &RequestId) -> Option<CallbackOutcome> {
    if url.host_str() != Some(name.as_str()) {
        return None;
    }

    let mut token = None;
    let mut error = None;
    let mut result = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            REQUEST_PARAM => token = Some(value.into_owned()),
            ERROR_PARAM => error = Some(value.into_owned()),
            RESULT_PARAM => result = Some(value.into_owned()),
            _ => {}
        }
    }

    if token.as_deref().and_then(RequestId::parse) != Some(*request) {
        return None;
    }

    if let Some(raw) = error {
        let code: i64 = raw.parse().ok()?;
        return WalletError::from_code(code).map(CallbackOutcome::Failure);
    }

    let bytes = BASE64.decode(result?.as_bytes()).ok()?;
    Some(CallbackOutcome::Success(bytes))
}
