//! End-to-end tests for the request → wallet → callback round trip.
//!
//! A fake wallet stands in for the external app: it parses the request
//! URL the opener received and answers over the embedded callback URL,
//! exactly as the OS-mediated loop would. No test here needs the network
//! or a real wallet install.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use url::Url;

use wallet_handoff::prelude::*;

// ─── Harness ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct RecordingOpener {
    opened: Arc<Mutex<Vec<String>>>,
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), SdkError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

impl RecordingOpener {
    fn last_request(&self) -> String {
        self.opened.lock().unwrap().last().cloned().unwrap()
    }
}

fn test_client(opener: RecordingOpener) -> HandoffClient {
    HandoffClient::builder()
        .callback_scheme(Scheme::new("myapp").unwrap())
        .directory(FixedDirectory::installed(WalletApp::new(
            Scheme::new("trust").unwrap(),
        )))
        .opener(opener)
        .build()
        .unwrap()
}

/// What the fake wallet answers with.
enum Reply {
    Signed(Vec<u8>),
    Error(i64),
}

/// Play the wallet's side: pull the callback URL out of a request URL and
/// append the response parameter, as a real wallet app would.
fn wallet_reply(request_url: &str, reply: Reply) -> String {
    let parsed = Url::parse(request_url).expect("request URL must parse");
    let callback = parsed
        .query_pairs()
        .find(|(k, _)| k == "callback")
        .map(|(_, v)| v.into_owned())
        .expect("request URL must carry a callback");
    match reply {
        Reply::Signed(bytes) => format!("{callback}&result={}", BASE64.encode(bytes)),
        Reply::Error(code) => format!("{callback}&error={code}"),
    }
}

type Outcome = Arc<Mutex<Vec<Result<Vec<u8>, SdkError>>>>;

fn recording_sink() -> (impl FnOnce(Result<Vec<u8>, SdkError>) + Send + 'static, Outcome) {
    let outcomes: Outcome = Arc::new(Mutex::new(Vec::new()));
    let clone = outcomes.clone();
    (move |o| clone.lock().unwrap().push(o), outcomes)
}

// ─── Round trips ─────────────────────────────────────────────────────────────

#[test]
fn sign_message_success_round_trip() {
    let opener = RecordingOpener::default();
    let client = test_client(opener.clone());
    let (sink, outcomes) = recording_sink();

    client.sign_message(vec![1, 2, 3], None, sink).unwrap();

    let request_url = opener.last_request();
    assert!(request_url.starts_with("trust://sign-message?message=AQID&callback="));

    // The wallet signs and the OS delivers the callback.
    let callback = wallet_reply(&request_url, Reply::Signed(vec![0xAA, 0xBB]));
    assert!(callback.starts_with("myapp://sign-message?request="));
    assert!(client.handle_open_url(&callback));

    assert_eq!(outcomes.lock().unwrap().as_slice(), &[Ok(vec![0xAA, 0xBB])]);
    assert_eq!(client.pending(), 0);
}

#[test]
fn sign_message_with_address_round_trip() {
    let opener = RecordingOpener::default();
    let client = test_client(opener.clone());
    let (sink, outcomes) = recording_sink();

    client
        .sign_message(vec![1, 2, 3], Some(Address::from("0xabc")), sink)
        .unwrap();

    let parsed = Url::parse(&opener.last_request()).unwrap();
    let address = parsed
        .query_pairs()
        .find(|(k, _)| k == "address")
        .map(|(_, v)| v.into_owned());
    assert_eq!(address.as_deref(), Some("0xabc"));

    let callback = wallet_reply(&opener.last_request(), Reply::Signed(vec![7]));
    assert!(client.handle_open_url(&callback));
    assert_eq!(outcomes.lock().unwrap().as_slice(), &[Ok(vec![7])]);
}

#[test]
fn user_declines_in_wallet() {
    let opener = RecordingOpener::default();
    let client = test_client(opener.clone());
    let (sink, outcomes) = recording_sink();

    client.sign_message(b"payload".to_vec(), None, sink).unwrap();
    let callback = wallet_reply(&opener.last_request(), Reply::Error(1));
    assert!(client.handle_open_url(&callback));

    assert_eq!(
        outcomes.lock().unwrap().as_slice(),
        &[Err(SdkError::Wallet(WalletError::RequestDenied))]
    );
    assert_eq!(client.pending(), 0);
}

#[test]
fn concurrent_commands_resolve_independently() {
    let opener = RecordingOpener::default();
    let client = test_client(opener.clone());
    let (first_sink, first_outcomes) = recording_sink();
    let (second_sink, second_outcomes) = recording_sink();

    client.sign_message(vec![1], None, first_sink).unwrap();
    let first_request = opener.last_request();
    client.sign_message(vec![2], None, second_sink).unwrap();
    let second_request = opener.last_request();
    assert_eq!(client.pending(), 2);

    // Out-of-order answers: second command resolves first.
    assert!(client.handle_open_url(&wallet_reply(&second_request, Reply::Signed(vec![22]))));
    assert!(first_outcomes.lock().unwrap().is_empty());
    assert_eq!(client.pending(), 1);

    assert!(client.handle_open_url(&wallet_reply(&first_request, Reply::Signed(vec![11]))));
    assert_eq!(first_outcomes.lock().unwrap().as_slice(), &[Ok(vec![11])]);
    assert_eq!(second_outcomes.lock().unwrap().as_slice(), &[Ok(vec![22])]);
}

// ─── Non-resolution paths ────────────────────────────────────────────────────

#[test]
fn unrelated_callback_leaves_command_pending() {
    let opener = RecordingOpener::default();
    let client = test_client(opener.clone());
    let (sink, outcomes) = recording_sink();

    client.sign_message(vec![1, 2, 3], None, sink).unwrap();

    assert!(!client.handle_open_url("myapp://other-command?result=AQID"));
    assert!(!client.handle_open_url("https://example.com/?result=AQID"));
    assert!(outcomes.lock().unwrap().is_empty());
    assert_eq!(client.pending(), 1);
}

#[test]
fn malformed_callbacks_never_resolve() {
    let opener = RecordingOpener::default();
    let client = test_client(opener.clone());
    let (sink, outcomes) = recording_sink();

    client.sign_message(vec![1, 2, 3], None, sink).unwrap();
    let good = wallet_reply(&opener.last_request(), Reply::Signed(vec![1]));
    // Derive malformed variants of the genuine callback.
    let callback_base = good.split("&result=").next().unwrap().to_string();

    for bad in [
        format!("{callback_base}&error=not-a-number"),
        format!("{callback_base}&error=9999"),
        format!("{callback_base}&result=not-valid-base64!!"),
        callback_base.clone(),
    ] {
        assert!(!client.handle_open_url(&bad), "expected no match for {bad}");
    }
    assert!(outcomes.lock().unwrap().is_empty());
    assert_eq!(client.pending(), 1);

    // The command is stranded, not dead: a later well-formed callback
    // still resolves it.
    assert!(client.handle_open_url(&good));
    assert_eq!(outcomes.lock().unwrap().as_slice(), &[Ok(vec![1])]);
}

#[test]
fn duplicate_callback_delivery_is_ignored() {
    let opener = RecordingOpener::default();
    let client = test_client(opener.clone());
    let (sink, outcomes) = recording_sink();

    client.sign_message(vec![1], None, sink).unwrap();
    let callback = wallet_reply(&opener.last_request(), Reply::Signed(vec![9]));

    assert!(client.handle_open_url(&callback));
    assert!(!client.handle_open_url(&callback));
    assert_eq!(outcomes.lock().unwrap().as_slice(), &[Ok(vec![9])]);
}

#[test]
fn wallet_unavailable_falls_back_before_emission() {
    let opener = RecordingOpener::default();
    let client = HandoffClient::builder()
        .callback_scheme(Scheme::new("myapp").unwrap())
        .directory(FixedDirectory::absent())
        .opener(opener.clone())
        .build()
        .unwrap();

    let (sink, outcomes) = recording_sink();
    let err = client.sign_message(vec![1], None, sink).err().unwrap();
    assert_eq!(err, SdkError::WalletUnavailable);
    assert!(opener.opened.lock().unwrap().is_empty());
    assert!(outcomes.lock().unwrap().is_empty());
}

// ─── Async adapter ───────────────────────────────────────────────────────────

#[cfg(feature = "async")]
#[tokio::test]
async fn sign_message_async_resolves_on_callback() {
    let opener = RecordingOpener::default();
    let client = Arc::new(test_client(opener.clone()));

    let signer = client.clone();
    let pending = tokio::spawn(async move {
        signer.sign_message_async(vec![1, 2, 3], None).await
    });

    // Wait for the request to be emitted, then answer as the wallet.
    while opener.opened.lock().unwrap().is_empty() {
        tokio::task::yield_now().await;
    }
    let callback = wallet_reply(&opener.last_request(), Reply::Signed(vec![5, 6]));
    assert!(client.handle_open_url(&callback));

    assert_eq!(pending.await.unwrap(), Ok(vec![5, 6]));
}
