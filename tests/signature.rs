use marketplace_orders::gateway::{
    SignatureError, SignatureVerifier,
    signature::{compute_signature, signature_header},
};

const NOW: i64 = 1_700_000_000;

fn payload() -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_test_1" } }
    }))
    .unwrap()
}

fn verifier() -> SignatureVerifier {
    SignatureVerifier::new(vec!["whsec_old".into(), "whsec_new".into()], 300)
}

#[test]
fn accepts_signature_from_first_secret() {
    let body = payload();
    let header = signature_header("whsec_old", NOW, &body);

    let event = verifier().verify_at(&body, Some(&header), NOW).unwrap();
    assert_eq!(event.id, "evt_1");
    assert!(event.is_checkout_event());
}

#[test]
fn accepts_signature_from_rotated_secret() {
    let body = payload();
    let header = signature_header("whsec_new", NOW, &body);

    assert!(verifier().verify_at(&body, Some(&header), NOW + 10).is_ok());
}

#[test]
fn accepts_when_any_v1_entry_matches() {
    let body = payload();
    let header = format!(
        "t={NOW},v1={},v1={}",
        compute_signature("whsec_unknown", NOW, &body),
        compute_signature("whsec_new", NOW, &body)
    );

    assert!(verifier().verify_at(&body, Some(&header), NOW).is_ok());
}

#[test]
fn rejects_unknown_secret() {
    let body = payload();
    let header = signature_header("whsec_other", NOW, &body);

    let err = verifier().verify_at(&body, Some(&header), NOW).unwrap_err();
    assert!(matches!(err, SignatureError::NoMatchingSecret));
}

#[test]
fn rejects_tampered_body() {
    let body = payload();
    let header = signature_header("whsec_old", NOW, &body);
    let mut tampered = body.clone();
    tampered.extend_from_slice(b" ");

    let err = verifier().verify_at(&tampered, Some(&header), NOW).unwrap_err();
    assert!(matches!(err, SignatureError::NoMatchingSecret));
}

#[test]
fn rejects_stale_timestamp() {
    let body = payload();
    let header = signature_header("whsec_old", NOW - 301, &body);

    let err = verifier().verify_at(&body, Some(&header), NOW).unwrap_err();
    assert!(matches!(err, SignatureError::StaleTimestamp));
}

#[test]
fn rejects_missing_and_malformed_headers() {
    let body = payload();
    let v = verifier();

    assert!(matches!(
        v.verify_at(&body, None, NOW).unwrap_err(),
        SignatureError::MissingHeader
    ));
    assert!(matches!(
        v.verify_at(&body, Some("  "), NOW).unwrap_err(),
        SignatureError::MissingHeader
    ));
    assert!(matches!(
        v.verify_at(&body, Some("garbage"), NOW).unwrap_err(),
        SignatureError::MalformedHeader
    ));
    assert!(matches!(
        v.verify_at(&body, Some(&format!("t={NOW}")), NOW).unwrap_err(),
        SignatureError::MalformedHeader
    ));
}

#[test]
fn signed_but_unparseable_payload_is_rejected() {
    let body = b"not json".to_vec();
    let header = signature_header("whsec_old", NOW, &body);

    let err = verifier().verify_at(&body, Some(&header), NOW).unwrap_err();
    assert!(matches!(err, SignatureError::InvalidPayload(_)));
}
