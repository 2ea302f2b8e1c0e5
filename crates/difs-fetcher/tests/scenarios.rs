// Integration tests exercising the concrete scenarios from spec.md §8
// ("Concrete scenarios" S1-S5) end to end: producer signs an object,
// `ScriptedFace` plays back (and perturbs) the wire, and the fetcher's
// callbacks are asserted against the expected outcome. S6 (empty-input
// signer behavior) is covered directly in `difs-producer`'s unit tests.

use difs_crypto::InMemoryKeyStore;
use difs_fetcher::face::NackReason;
use difs_fetcher::testing::ScriptedFace;
use difs_fetcher::{
    start, ChainAwareValidator, FetchError, FetchParameters, FetcherCallbacks,
    JacobsonRttEstimator, RttOptions,
};
use difs_producer::{sign_object, SignerOptions};
use difs_types::Name;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
enum Outcome {
    Complete(Vec<u8>),
    InOrderComplete,
    Error(FetchError),
}

fn fast_rtt_options() -> RttOptions {
    RttOptions {
        initial_rto: Duration::from_millis(30),
        min_rto: Duration::from_millis(10),
        max_rto: Duration::from_secs(1),
        ..RttOptions::default()
    }
}

async fn run_fetch(
    prefix: Name,
    face: Arc<ScriptedFace>,
    verifying_key: Vec<u8>,
    options: FetchParameters,
) -> (mpsc::UnboundedReceiver<Outcome>, difs_fetcher::FetcherHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let tx_complete = tx.clone();
    let tx_in_order = tx.clone();
    let tx_error = tx;
    let callbacks = FetcherCallbacks::new()
        .on_complete(move |bytes| {
            let _ = tx_complete.send(Outcome::Complete(bytes));
        })
        .on_in_order_complete(move || {
            let _ = tx_in_order.send(Outcome::InOrderComplete);
        })
        .on_error(move |e| {
            let _ = tx_error.send(Outcome::Error(e));
        });
    let validator = Arc::new(ChainAwareValidator::new(verifying_key));
    let rtt = Box::new(JacobsonRttEstimator::new(fast_rtt_options()));
    let handle = start(prefix, face, validator, rtt, options, callbacks);
    (rx, handle)
}

fn sign(prefix: &Name, content: &[u8], max_segment_size: usize) -> (Vec<difs_types::Data>, Vec<u8>) {
    let store = InMemoryKeyStore::new();
    let verifying_key = store.generate("signer-1");
    let options = SignerOptions {
        max_segment_size,
        signer_identity: "signer-1".to_string(),
        ..Default::default()
    };
    let segments = sign_object(prefix, Cursor::new(content.to_vec()), &store, &options).unwrap();
    (segments, verifying_key.to_sec1_bytes().to_vec())
}

#[tokio::test]
async fn s1_single_segment_object() {
    let prefix = Name::from_str_components("/difs/s1");
    let (segments, vk) = sign(&prefix, b"hi", 8192);
    let face = Arc::new(ScriptedFace::new(segments));
    let (mut rx, _handle) = run_fetch(prefix, face, vk, FetchParameters::default()).await;

    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Some(Outcome::Complete(bytes))) => assert_eq!(bytes, b"hi"),
        other => panic!("expected Complete(\"hi\"), got {other:?}"),
    }
}

#[tokio::test]
async fn s2_out_of_order_delivery_reassembles_correctly() {
    let prefix = Name::from_str_components("/difs/s2");
    let a = vec![b'A'; 4096];
    let b = vec![b'B'; 4096];
    let c = vec![b'C'; 4096];
    let mut content = Vec::new();
    content.extend(&a);
    content.extend(&b);
    content.extend(&c);
    let (segments, vk) = sign(&prefix, &content, 4096 + 32);
    assert_eq!(segments.len(), 3);

    let face = Arc::new(ScriptedFace::new(segments));
    // Segment 0 answers discovery first; segments 1 and 2 are then
    // requested together but made to race so 2 answers before 1, so the
    // three responses do not arrive in segment order.
    face.set_discovery_segment(0).await;
    face.set_delay(1, Duration::from_millis(10)).await;
    face.set_delay(2, Duration::from_millis(1)).await;

    let options = FetchParameters {
        init_cwnd: 3.0,
        init_ssthresh: 10.0,
        ..Default::default()
    };
    let (mut rx, _handle) = run_fetch(prefix, face, vk, options).await;

    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Some(Outcome::Complete(bytes))) => assert_eq!(bytes, content),
        other => panic!("expected Complete(A||B||C), got {other:?}"),
    }
}

#[tokio::test]
async fn s2_final_segment_arriving_first_does_not_spuriously_fail() {
    // The literal §8 S2 delivery order: discovery resolves straight to the
    // final-numbered segment (2), so `n_segments` is known before segment 0
    // or 1 has anchored anything. The under-half guard must not fire until
    // every segment has actually been received, not merely on arrival of
    // the segment carrying the final block id.
    let prefix = Name::from_str_components("/difs/s2-final-first");
    let a = vec![b'A'; 4096];
    let b = vec![b'B'; 4096];
    let c = vec![b'C'; 4096];
    let mut content = Vec::new();
    content.extend(&a);
    content.extend(&b);
    content.extend(&c);
    let (segments, vk) = sign(&prefix, &content, 4096 + 32);
    assert_eq!(segments.len(), 3);

    let face = Arc::new(ScriptedFace::new(segments));
    face.set_discovery_segment(2).await;
    face.set_delay(0, Duration::from_millis(1)).await;
    face.set_delay(1, Duration::from_millis(20)).await;

    let options = FetchParameters {
        init_cwnd: 3.0,
        init_ssthresh: 10.0,
        ..Default::default()
    };
    let (mut rx, _handle) = run_fetch(prefix, face, vk, options).await;

    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Some(Outcome::Complete(bytes))) => assert_eq!(bytes, content),
        other => panic!("expected Complete(A||B||C), got {other:?}"),
    }
}

#[tokio::test]
async fn s3_forged_segment_breaks_chain_linkage() {
    use difs_crypto::signer::{HashChainSha256Signer, Signer};

    let prefix = Name::from_str_components("/difs/s3");
    let content = vec![0u8; 3 * 16];
    let (segments, vk) = sign(&prefix, &content, 16 + 32);
    assert_eq!(segments.len(), 3);

    let real_segment_1 = segments[1].clone();
    let face = Arc::new(ScriptedFace::new(segments));

    // Forge a self-consistent replacement for segment 1: its own
    // signature still matches its own signed portion, so the validator
    // accepts it, but segment 0's NextHash no longer anchors it.
    let mut forged = real_segment_1;
    forged.content = b"forged content, different from the original".to_vec();
    forged.signature_value = HashChainSha256Signer.sign(&forged.signed_portion());
    face.replace_segment(forged).await;

    let options = FetchParameters {
        init_cwnd: 1.0,
        ..Default::default()
    };
    let (mut rx, _handle) = run_fetch(prefix, face, vk, options).await;

    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Some(Outcome::Error(FetchError::HashChainError(_)))) => {}
        other => panic!("expected HashChainError, got {other:?}"),
    }
}

#[tokio::test]
async fn s4_retransmission_after_timeout_still_completes() {
    let prefix = Name::from_str_components("/difs/s4");
    let content: Vec<u8> = (0u8..100).collect();
    let (segments, vk) = sign(&prefix, &content, 16 + 32);
    assert_eq!(segments.len(), 7);

    let face = Arc::new(ScriptedFace::new(segments));
    for n in [1u64, 3, 5] {
        face.drop_before_respond(n, 1).await;
    }

    let options = FetchParameters {
        max_timeout: Duration::from_secs(5),
        use_constant_interest_timeout: false,
        ..Default::default()
    };
    let (mut rx, _handle) = run_fetch(prefix, face, vk, options).await;

    match tokio::time::timeout(Duration::from_secs(10), rx.recv()).await {
        Ok(Some(Outcome::Complete(bytes))) => assert_eq!(bytes, content),
        other => panic!("expected Complete after retransmits, got {other:?}"),
    }
}

#[tokio::test]
async fn s5_congestion_marks_do_not_break_delivery() {
    let prefix = Name::from_str_components("/difs/s5");
    let content: Vec<u8> = (0u32..6400).map(|i| (i % 256) as u8).collect();
    let (segments, vk) = sign(&prefix, &content, 64 + 32);
    assert_eq!(segments.len(), 100);

    let face = Arc::new(ScriptedFace::new(segments));
    face.mark_congested(20).await;
    face.mark_congested(40).await;

    let options = FetchParameters {
        init_cwnd: 4.0,
        init_ssthresh: 20.0,
        ..Default::default()
    };
    let (mut rx, _handle) = run_fetch(prefix, face, vk, options).await;

    match tokio::time::timeout(Duration::from_secs(10), rx.recv()).await {
        Ok(Some(Outcome::Complete(bytes))) => assert_eq!(bytes, content),
        other => panic!("expected Complete despite congestion marks, got {other:?}"),
    }
}

#[tokio::test]
async fn fatal_nack_terminates_with_nack_error() {
    let prefix = Name::from_str_components("/difs/nack");
    let (segments, vk) = sign(&prefix, b"abcdef", 3 + 32);
    let face = Arc::new(ScriptedFace::new(segments));
    face.nack_once(0, NackReason::Other("no-route".to_string())).await;

    let (mut rx, _handle) = run_fetch(prefix, face, vk, FetchParameters::default()).await;

    match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Some(Outcome::Error(FetchError::NackError(_)))) => {}
        other => panic!("expected NackError, got {other:?}"),
    }
}

#[tokio::test]
async fn stop_is_idempotent_after_completion() {
    let prefix = Name::from_str_components("/difs/idempotent");
    let (segments, vk) = sign(&prefix, b"hi", 8192);
    let face = Arc::new(ScriptedFace::new(segments));
    let (mut rx, handle) = run_fetch(prefix, face, vk, FetchParameters::default()).await;

    let _ = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
    handle.stop().await;
    handle.stop().await;
}
