//! Unit tests for the session token module

mod key_store_tests;

use once_cell::sync::Lazy;

use crate::domain::entities::KeyPair;

/// One generated pair per test binary
pub(super) static TEST_KEY_PAIR: Lazy<KeyPair> =
    Lazy::new(|| KeyPair::generate().expect("test key pair"));

/// Second, unrelated pair
pub(super) static OTHER_KEY_PAIR: Lazy<KeyPair> =
    Lazy::new(|| KeyPair::generate().expect("other test key pair"));
