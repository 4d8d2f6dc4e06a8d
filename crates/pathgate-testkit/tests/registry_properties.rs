//! Registry behavior against every store implementation.

use proptest::prelude::*;

use pathgate::perms::PermissionState;
use pathgate::store::{SqliteStore, Store};
use pathgate::{
    AdminState, CanonicalPath, CanonicalPrefix, ErrorKind, MemoryLedger, PathMode, Registry,
    RegistryConfig, RegistryError,
};
use pathgate_testkit::fixtures::{TestFixture, ADMIN, ALICE, BOB};
use pathgate_testkit::generators;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Run an async scenario against both the memory and the SQLite store.
macro_rules! both_stores {
    ($($name:ident => $scenario:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    init_tracing();
                    $scenario(TestFixture::new().await).await;
                }
            )*
        }
        mod sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    init_tracing();
                    $scenario(TestFixture::sqlite().await).await;
                }
            )*
        }
    };
}

both_stores! {
    last_write_wins => scenario_last_write_wins,
    revocation_blocks_and_restores => scenario_revocation,
    transfer_moves_write_capability => scenario_transfer,
    empty_prefix_set_removes_access => scenario_empty_prefixes,
    renounced_admin_is_terminal => scenario_renounce,
    sibling_prefix_is_not_covered => scenario_sibling_prefix,
    burned_token_cannot_write => scenario_burn,
    rejected_operations_log_nothing => scenario_no_partial_mutation,
    log_replays_to_current_state => scenario_replay,
}

const MANIFEST: &str = "/agent1/files/manifest.json";

async fn scenario_last_write_wins<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.holder(1, ALICE, &["/agent1"]).await;

    fx.registry.write(&ALICE, &key, MANIFEST, "v1").await.unwrap();
    assert!(fx.registry.reader().exists(MANIFEST).await.unwrap());

    fx.registry.write(&ALICE, &key, MANIFEST, "v2").await.unwrap();
    assert!(fx.registry.reader().exists(MANIFEST).await.unwrap());
    assert_eq!(fx.registry.reader().read(MANIFEST).await.unwrap().as_str(), "v2");

    let history = fx.registry.reader().events_for_path(MANIFEST).await.unwrap();
    assert_eq!(history.len(), 2);
}

async fn scenario_revocation<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.holder(1, ALICE, &["/agent1"]).await;
    fx.registry.set_revoked(&ADMIN, &key, true).await.unwrap();

    let err = fx.registry.write(&ALICE, &key, MANIFEST, "v1").await.unwrap_err();
    assert!(matches!(err, RegistryError::TokenWritesRevoked(k) if k == key));
    assert_eq!(err.kind(), ErrorKind::WritesRevoked);

    // Prefixes survive revocation untouched.
    assert_eq!(fx.registry.reader().prefixes(&key).await.unwrap().len(), 1);

    fx.registry.set_revoked(&ADMIN, &key, false).await.unwrap();
    fx.registry.write(&ALICE, &key, MANIFEST, "v1").await.unwrap();
}

async fn scenario_transfer<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.holder(1, ALICE, &["/agent1"]).await;
    fx.registry.write(&ALICE, &key, MANIFEST, "from-alice").await.unwrap();

    fx.transfer(1, ALICE, BOB);

    let err = fx.registry.write(&ALICE, &key, MANIFEST, "stale").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotTokenOwner { caller, .. } if caller == ALICE));
    assert!(err.kind().is_retryable_after_transfer());

    fx.registry.write(&BOB, &key, MANIFEST, "from-bob").await.unwrap();
    assert_eq!(fx.registry.reader().read(MANIFEST).await.unwrap().as_str(), "from-bob");
}

async fn scenario_empty_prefixes<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.holder(1, ALICE, &["/agent1"]).await;
    fx.registry.write(&ALICE, &key, MANIFEST, "v1").await.unwrap();

    fx.grant(&key, &[]).await;
    let err = fx.registry.write(&ALICE, &key, MANIFEST, "v2").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnauthorizedPath);

    fx.grant(&key, &["/agent1"]).await;
    fx.registry.write(&ALICE, &key, MANIFEST, "v2").await.unwrap();
}

async fn scenario_renounce<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.mint(1, ALICE);
    fx.registry.renounce_admin(&ADMIN).await.unwrap();
    assert_eq!(fx.registry.reader().admin().await.unwrap(), AdminState::Disabled);

    for _ in 0..2 {
        assert!(matches!(
            fx.registry.replace_prefixes(&ADMIN, &key, ["/agent1"]).await,
            Err(RegistryError::AdminDisabled)
        ));
        assert!(matches!(
            fx.registry.set_revoked(&ADMIN, &key, true).await,
            Err(RegistryError::AdminDisabled)
        ));
        assert!(matches!(
            fx.registry.transfer_admin(&ADMIN, BOB).await,
            Err(RegistryError::AdminDisabled)
        ));
    }
}

async fn scenario_sibling_prefix<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.holder(1, ALICE, &["/agent1", "/shared/data"]).await;
    let reader = fx.registry.reader().clone();

    assert!(reader.can_write(&key, &ALICE, "/shared/data/sub/file1").await.unwrap());
    assert!(!reader.can_write(&key, &ALICE, "/shared/database/file1").await.unwrap());
    assert!(!reader.can_write(&key, &ALICE, "/agent10/x").await.unwrap());

    let err = fx
        .registry
        .write(&ALICE, &key, "/agent10/x", "v1")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnauthorizedPath { .. }));
}

async fn scenario_burn<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.holder(1, ALICE, &["/"]).await;
    fx.ledger.burn(pathgate_testkit::fixtures::NFT, 1u64).unwrap();

    let err = fx.registry.write(&ALICE, &key, "/a", "v1").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotTokenOwner { .. }));
}

async fn scenario_no_partial_mutation<S: Store>(mut fx: TestFixture<S>) {
    let key = fx.holder(1, ALICE, &["/agent1"]).await;
    let head = fx.registry.reader().head_seq().await.unwrap();

    assert!(fx.registry.write(&ALICE, &key, MANIFEST, "").await.is_err());
    assert!(fx.registry.write(&BOB, &key, MANIFEST, "x").await.is_err());
    assert!(fx
        .registry
        .replace_prefixes(&ADMIN, &key, ["/ok", "/not/ok/"])
        .await
        .is_err());
    assert!(fx.registry.set_revoked(&BOB, &key, true).await.is_err());
    // Unchanged flag: accepted, not logged.
    assert!(fx.registry.set_revoked(&ADMIN, &key, false).await.unwrap().is_none());

    assert_eq!(fx.registry.reader().head_seq().await.unwrap(), head);
    assert!(!fx.registry.reader().exists(MANIFEST).await.unwrap());
    let prefixes: Vec<_> = fx
        .registry
        .reader()
        .prefixes(&key)
        .await
        .unwrap()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    assert_eq!(prefixes, ["/agent1"]);
}

async fn scenario_replay<S: Store>(mut fx: TestFixture<S>) {
    let a = fx.holder(1, ALICE, &["/agent1", "/shared"]).await;
    let b = fx.holder(2, BOB, &["/agent2"]).await;
    fx.grant(&a, &["/agent1"]).await;
    fx.registry.set_revoked(&ADMIN, &b, true).await.unwrap();
    fx.registry.write(&ALICE, &a, MANIFEST, "v1").await.unwrap();
    fx.registry.transfer_admin(&ADMIN, BOB).await.unwrap();

    let log = fx.registry.reader().events_since(0).await.unwrap();
    let seqs: Vec<_> = log.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (1..=log.len() as u64).collect::<Vec<_>>());

    let state = PermissionState::replay(&log).unwrap();
    for key in [a, b] {
        let stored = fx.registry.reader().prefixes(&key).await.unwrap();
        assert_eq!(state.record(&key).prefixes, stored);
        assert_eq!(
            state.record(&key).revoked,
            fx.registry.reader().is_revoked(&key).await.unwrap()
        );
    }
    assert_eq!(state.admin(), Some(&AdminState::Owner(BOB)));
}

#[tokio::test]
async fn reopen_from_disk_keeps_state() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("registry.db");

    let ledger = std::sync::Arc::new(MemoryLedger::new());
    ledger.deploy_contract(pathgate_testkit::fixtures::NFT).unwrap();
    let key = pathgate::PermissionKey::new(pathgate_testkit::fixtures::NFT, 1u64);
    ledger.mint(pathgate_testkit::fixtures::NFT, 1u64, ALICE).unwrap();

    {
        let store = SqliteStore::open(&db).unwrap();
        let mut registry =
            Registry::create(store, ledger.clone(), ADMIN, RegistryConfig::default())
                .await
                .unwrap();
        registry.replace_prefixes(&ADMIN, &key, ["/agent1"]).await.unwrap();
        registry.write(&ALICE, &key, MANIFEST, "persisted").await.unwrap();
    }

    let store = SqliteStore::open(&db).unwrap();
    assert!(matches!(
        Registry::create(store, ledger.clone(), ADMIN, RegistryConfig::default()).await,
        Err(RegistryError::AlreadyInitialized)
    ));

    let store = SqliteStore::open(&db).unwrap();
    let mut registry = Registry::open(store, ledger, RegistryConfig::default())
        .await
        .unwrap();
    assert_eq!(
        registry.reader().read(MANIFEST).await.unwrap().as_str(),
        "persisted"
    );
    registry.write(&ALICE, &key, MANIFEST, "again").await.unwrap();
    assert_eq!(registry.reader().head_seq().await.unwrap(), 4);
}

proptest! {
    #[test]
    fn no_leading_slash_always_fails(raw in generators::raw_input()) {
        prop_assume!(!raw.starts_with('/'));
        prop_assert!(pathgate::core::canonicalize(&raw, PathMode::Prefix).is_err());
        prop_assert!(pathgate::core::canonicalize(&raw, PathMode::FilePath).is_err());
    }

    #[test]
    fn double_slash_always_fails(
        (head, tail) in (generators::prefix(), generators::file_path()),
    ) {
        let raw = format!("{}/{}", head.trim_end_matches('/'), tail);
        prop_assume!(raw.contains("//"));
        prop_assert!(CanonicalPath::parse(&raw).is_err());
        prop_assert!(CanonicalPrefix::parse(&raw).is_err());
    }

    #[test]
    fn canonicalization_is_idempotent(raw in generators::raw_input()) {
        for mode in [PathMode::Prefix, PathMode::FilePath] {
            if let Ok(once) = pathgate::core::canonicalize(&raw, mode) {
                prop_assert_eq!(pathgate::core::canonicalize(&once, mode), Ok(once.clone()));
                prop_assert_eq!(once, raw.clone());
            }
        }
    }
}
