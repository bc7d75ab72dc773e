//! Property-based tests for request signing and state comparison

use mailru_auth::oauth2::{canonical_string, sign, state_matches, ClientCredentials, SignedRequest};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;

/// `sig` of a `users.getInfo`-style request built from the given fields
fn sig_of(app_id: &str, session_key: &str, method: &str, uids: &str) -> String {
    let credentials = ClientCredentials::new(app_id, "app-secret");
    let mut params = SignedRequest::new(method, session_key)
        .param("uids", uids)
        .signed_params(&credentials);
    params.remove("sig").unwrap_or_default()
}

/// Parameter maps with API-like keys and arbitrary printable values
fn arb_params() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,24}", 0..8)
}

proptest! {
    /// Signing the same parameters twice yields the same signature.
    #[test]
    fn signature_is_deterministic(params in arb_params(), secret in "[a-f0-9]{0,32}") {
        prop_assert_eq!(sign(&params, &secret), sign(&params, &secret));
    }

    /// Signatures are 32 lowercase hex digits.
    #[test]
    fn signature_is_md5_hex(params in arb_params(), secret in "[ -~]{0,32}") {
        let sig = sign(&params, &secret);
        prop_assert_eq!(sig.len(), 32);
        prop_assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    /// The canonical string lists every pair in ascending key order.
    #[test]
    fn canonical_string_is_sorted_concatenation(pairs in proptest::collection::vec(("[a-z_]{1,8}", "[a-z0-9]{0,6}"), 0..8)) {
        let params: BTreeMap<String, String> = pairs.into_iter().rev().collect();
        let mut sorted: Vec<(&String, &String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        let expected: String = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect();
        prop_assert_eq!(canonical_string(&params), expected);
    }

    /// Changing the secret changes the signature.
    #[test]
    fn signature_depends_on_secret(params in arb_params(), a in "[a-z]{8}", b in "[a-z]{8}") {
        prop_assume!(a != b);
        prop_assert_ne!(sign(&params, &a), sign(&params, &b));
    }

    /// The signature in a signed request verifies against the other parameters.
    #[test]
    fn signed_request_verifies(method in "[a-z]{1,8}\\.[a-zA-Z]{1,12}", key in "[a-z0-9]{1,32}", uids in "[0-9]{1,19}") {
        let credentials = ClientCredentials::new("423004", "app-secret");
        let mut params = SignedRequest::new(method, key).param("uids", uids).signed_params(&credentials);
        let sig = params.remove("sig").unwrap();
        prop_assert_eq!(sig, sign(&params, "app-secret"));
    }

    /// Numbers and strings compare by their text.
    #[test]
    fn numeric_state_matches_its_text(n in any::<u32>()) {
        let text = n.to_string();
        prop_assert!(state_matches(Some(&json!(n)), Some(&text)));
        prop_assert!(state_matches(Some(&json!(text.clone())), Some(&text)));
    }

    /// Changing the app id alone changes the signature.
    #[test]
    fn signature_depends_on_app_id(a in "[0-9]{1,9}", b in "[0-9]{1,9}", key in "[a-z0-9]{1,32}") {
        prop_assume!(a != b);
        prop_assert_ne!(sig_of(&a, &key, "users.getInfo", "1"), sig_of(&b, &key, "users.getInfo", "1"));
    }

    /// Changing the session key alone changes the signature.
    #[test]
    fn signature_depends_on_session_key(a in "[a-z0-9]{1,32}", b in "[a-z0-9]{1,32}") {
        prop_assume!(a != b);
        prop_assert_ne!(sig_of("423004", &a, "users.getInfo", "1"), sig_of("423004", &b, "users.getInfo", "1"));
    }

    /// Changing the method alone changes the signature.
    #[test]
    fn signature_depends_on_method(a in "[a-z]{1,8}\\.[a-zA-Z]{1,12}", b in "[a-z]{1,8}\\.[a-zA-Z]{1,12}") {
        prop_assume!(a != b);
        prop_assert_ne!(sig_of("423004", "key", &a, "1"), sig_of("423004", "key", &b, "1"));
    }

    /// Changing an extra parameter value alone changes the signature.
    #[test]
    fn signature_depends_on_extra_param(a in "[0-9]{1,19}", b in "[0-9]{1,19}") {
        prop_assume!(a != b);
        prop_assert_ne!(sig_of("423004", "key", "users.getInfo", &a), sig_of("423004", "key", "users.getInfo", &b));
    }
}
