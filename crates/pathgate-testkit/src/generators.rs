//! Proptest generators for property-based testing.

use proptest::prelude::*;

use pathgate_core::{Address, Cid, PermissionKey, TokenId};

/// One legal path segment without dots.
pub fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,10}"
}

/// Final segment of a file path, with or without a single inner dot.
pub fn file_name() -> impl Strategy<Value = String> {
    prop_oneof![
        segment(),
        (segment(), segment()).prop_map(|(stem, ext)| format!("{stem}.{ext}")),
    ]
}

/// A canonical prefix string, root included.
pub fn prefix() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just("/".to_string()),
        9 => prop::collection::vec(segment(), 1..5).prop_map(|segs| format!("/{}", segs.join("/"))),
    ]
}

/// A canonical file path string.
pub fn file_path() -> impl Strategy<Value = String> {
    (prop::collection::vec(segment(), 0..4), file_name()).prop_map(|(dirs, name)| {
        let mut path = String::new();
        for dir in dirs {
            path.push('/');
            path.push_str(&dir);
        }
        path.push('/');
        path.push_str(&name);
        path
    })
}

/// A file path nested somewhere below `prefix`.
pub fn path_under(prefix: String) -> impl Strategy<Value = String> {
    file_path().prop_map(move |tail| {
        if prefix == "/" {
            tail
        } else {
            format!("{prefix}{tail}")
        }
    })
}

/// Arbitrary input over an alphabet rich in grammar-relevant characters.
pub fn raw_input() -> impl Strategy<Value = String> {
    "[/a-zA-Z0-9._@ -]{0,24}"
}

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

/// Generate a random TokenId over the full 256-bit range.
pub fn token_id() -> impl Strategy<Value = TokenId> {
    any::<[u8; 32]>().prop_map(TokenId::from_be_bytes)
}

/// Generate a random PermissionKey.
pub fn permission_key() -> impl Strategy<Value = PermissionKey> {
    (address(), token_id()).prop_map(|(contract, token_id)| PermissionKey::new(contract, token_id))
}

/// Generate a non-empty CID-like string.
pub fn cid() -> impl Strategy<Value = Cid> {
    "bafy[a-z2-7]{8,52}".prop_map(Cid::new)
}
