//! Cancellation token tests.

use framesift::CancellationToken;

#[test]
fn cancellation_token_default_not_cancelled() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn cancellation_token_cancel() {
    let token = CancellationToken::new();
    token.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_token_across_threads() {
    let token = CancellationToken::default();
    let worker_token = token.clone();

    std::thread::spawn(move || worker_token.cancel())
        .join()
        .unwrap();
    assert!(token.is_cancelled());
}
