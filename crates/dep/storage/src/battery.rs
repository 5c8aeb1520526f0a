//! A battery of tests every [`AllStorage`] backend must pass.

use chrono::Utc;
use dep_core::{DepConfig, OAuth1Tokens};

use crate::{
    AllStorage, DepNamesQueryFilter, DepNamesQueryRequest, Pagination, StorageError,
};

fn tokens(ck: &str) -> OAuth1Tokens {
    OAuth1Tokens {
        consumer_key: ck.to_string(),
        consumer_secret: "CS_456".into(),
        access_token: "AT_789".into(),
        access_secret: "AS_012".into(),
        access_token_expiry: "2024-12-11T00:00:00Z".parse().unwrap(),
    }
}

/// Run the full battery against `store`.
pub fn run<S: AllStorage>(store: &S) {
    empty_name(store, "battery-empty");
    with_name(store, "battery-name1");
    with_name(store, "battery-name2");
    query(store);
}

/// Retrieval against a name nothing was ever stored for.
fn empty_name<S: AllStorage>(store: &S, name: &str) {
    assert!(matches!(
        store.retrieve_staging_token_pki(name),
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        store.retrieve_current_token_pki(name),
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        store.retrieve_auth_tokens(name),
        Err(StorageError::NotFound)
    ));

    assert_eq!(store.retrieve_config(name).unwrap(), None);

    let (uuid, mod_time) = store.retrieve_assigner_profile(name).unwrap();
    assert_eq!(uuid, "");
    assert!(mod_time.is_none());

    assert_eq!(store.retrieve_cursor(name).unwrap(), "");
}

/// The whole record lifecycle for one name.
fn with_name<S: AllStorage>(store: &S, name: &str) {
    // PKI staging, retrieval, upstaging
    let (cert, key) = (b"-- fake cert --".to_vec(), b"-- fake key --".to_vec());
    store.store_token_pki(name, &cert, &key).unwrap();

    let (cert2, key2) = store.retrieve_staging_token_pki(name).unwrap();
    assert_eq!((&cert, &key), (&cert2, &key2));

    store.upstage_token_pki(name).unwrap();
    let (cert3, key3) = store.retrieve_current_token_pki(name).unwrap();
    assert_eq!((&cert, &key), (&cert3, &key3));

    // a new staging keypair leaves current untouched
    let (cert_b, key_b) = (b"-- fake cert B --".to_vec(), b"-- fake key B --".to_vec());
    store.store_token_pki(name, &cert_b, &key_b).unwrap();
    let (cur_cert, _) = store.retrieve_current_token_pki(name).unwrap();
    assert_eq!(cur_cert, cert);

    // tokens
    let t = tokens("CK_first");
    store.store_auth_tokens(name, &t).unwrap();
    assert_eq!(store.retrieve_auth_tokens(name).unwrap(), t);

    let t2 = tokens("CK_second");
    store.store_auth_tokens(name, &t2).unwrap();
    assert_eq!(store.retrieve_auth_tokens(name).unwrap(), t2);

    // config
    let cfg = DepConfig { base_url: "http://127.0.0.1:9001".into() };
    store.store_config(name, &cfg).unwrap();
    assert_eq!(store.retrieve_config(name).unwrap(), Some(cfg));

    // assigner profile
    let before = Utc::now();
    store.store_assigner_profile(name, "uuid-1234").unwrap();
    let (uuid, mod_time) = store.retrieve_assigner_profile(name).unwrap();
    assert_eq!(uuid, "uuid-1234");
    let mod_time = mod_time.expect("mod time set");
    // allow a little slack for filesystem timestamp granularity
    assert!(mod_time >= before - chrono::Duration::seconds(2));

    // cursor
    store.store_cursor(name, "MTY1ODE0NDQ5").unwrap();
    assert_eq!(store.retrieve_cursor(name).unwrap(), "MTY1ODE0NDQ5");
}

/// DEP name queries: staged names only, filtering, pagination.
fn query<S: AllStorage>(store: &S) {
    // both battery names staged a certificate above
    let all = store
        .query_dep_names(&DepNamesQueryRequest::default())
        .unwrap();
    assert!(all.dep_names.contains(&"battery-name1".to_string()));
    assert!(all.dep_names.contains(&"battery-name2".to_string()));
    // never-staged names don't appear
    assert!(!all.dep_names.contains(&"battery-empty".to_string()));

    // filter to one name
    let filtered = store
        .query_dep_names(&DepNamesQueryRequest {
            filter: Some(DepNamesQueryFilter {
                dep_names: vec!["battery-name2".into()],
            }),
            pagination: None,
        })
        .unwrap();
    assert_eq!(filtered.dep_names, vec!["battery-name2".to_string()]);

    // offset/limit walk: two single-result pages differ
    let page = |offset| {
        store
            .query_dep_names(&DepNamesQueryRequest {
                filter: None,
                pagination: Some(Pagination {
                    offset: Some(offset),
                    limit: Some(1),
                    cursor: None,
                }),
            })
            .unwrap()
            .dep_names
    };
    let (first, second) = (page(0), page(1));
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first, second);

    // cursor pagination is not supported by the shipped backends
    assert!(matches!(
        store.query_dep_names(&DepNamesQueryRequest {
            filter: None,
            pagination: Some(Pagination {
                offset: None,
                limit: None,
                cursor: Some("opaque".into()),
            }),
        }),
        Err(StorageError::OnlyOffset)
    ));

    // mixing cursor and offset is invalid
    assert!(matches!(
        store.query_dep_names(&DepNamesQueryRequest {
            filter: None,
            pagination: Some(Pagination {
                offset: Some(0),
                limit: None,
                cursor: Some("opaque".into()),
            }),
        }),
        Err(StorageError::InvalidPagination(_))
    ));
}
