//! Golden vectors against the registry and the client copy.
//!
//! Every implementation must produce identical:
//! - canonical form or violated rule
//! - subtree match decision
//! - path hash

use pathgate::{CanonicalPath, CanonicalPrefix, PathHash, PathMode, RegistryError};
use pathgate_client::{canonical_file_path, canonical_prefix, is_authorized, path_hash};
use pathgate_testkit::fixtures::{TestFixture, ALICE};
use pathgate_testkit::{hash_vectors, match_vectors, path_vectors, verify_all_vectors};

#[test]
fn test_reference_vectors() {
    for (name, passed, detail) in verify_all_vectors() {
        assert!(passed, "{name}: got {detail}");
    }
}

#[test]
fn test_client_grammar_agrees() {
    for v in path_vectors() {
        let got = match v.mode {
            PathMode::Prefix => canonical_prefix(v.input).map(|p| p.as_str().to_string()),
            PathMode::FilePath => canonical_file_path(v.input).map(|p| p.as_str().to_string()),
        };
        match (got, v.expected) {
            (Ok(s), Ok(expected)) => assert_eq!(s, expected, "{}", v.name),
            (Err(pathgate_client::ClientError::InvalidPath(e)), Err(rule)) => {
                assert_eq!(e.rule(), rule, "{}", v.name)
            }
            (got, expected) => panic!("{}: got {got:?}, expected {expected:?}", v.name),
        }
    }
}

#[test]
fn test_client_matcher_and_hash_agree() {
    for v in match_vectors() {
        assert_eq!(is_authorized([v.prefix], v.path).unwrap(), v.expected, "{v:?}");

        let prefix = CanonicalPrefix::parse(v.prefix).unwrap();
        let path = CanonicalPath::parse(v.path).unwrap();
        assert_eq!(prefix.covers(&path), v.expected, "{v:?}");
    }
    for v in hash_vectors() {
        assert_eq!(path_hash(v.path).unwrap().to_hex(), v.expected_hex);
    }
}

/// The registry rejects on write exactly the file paths the vectors reject.
#[tokio::test]
async fn test_registry_grammar_agrees() {
    let mut fx = TestFixture::new().await;
    let key = fx.holder(1, ALICE, &["/"]).await;

    for v in path_vectors().into_iter().filter(|v| v.mode == PathMode::FilePath) {
        let result = fx.registry.write(&ALICE, &key, v.input, "bafy").await;
        match (result, v.expected) {
            (Ok(event), Ok(_)) => {
                let path = CanonicalPath::parse(v.input).unwrap();
                let expected = PathHash::of(&path);
                assert!(matches!(
                    event.body,
                    pathgate::EventBody::FileWritten { path_hash, .. } if path_hash == expected
                ));
            }
            (Err(RegistryError::InvalidPath(e)), Err(rule)) => {
                assert_eq!(e.rule(), rule, "{}", v.name)
            }
            (got, expected) => panic!("{}: got {got:?}, expected {expected:?}", v.name),
        }
    }
}

#[tokio::test]
async fn test_registry_record_key_is_golden_hash() {
    let mut fx = TestFixture::new().await;
    let key = fx.holder(1, ALICE, &["/"]).await;

    for v in hash_vectors() {
        fx.registry.write(&ALICE, &key, v.path, "bafy").await.unwrap();
        let record = fx.registry.reader().file_record(v.path).await.unwrap().unwrap();
        assert_eq!(record.path_hash, PathHash::from_hex(v.expected_hex).unwrap());
    }
}
