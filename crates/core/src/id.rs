// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Newtype identifier helpers shared across the agent's data model.

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, and `Borrow<str>` implementations so the id can be used
/// directly as a hash-map key without an extra `.as_str()` at call sites.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Opaque id of a job granted by the coordinator.
    pub struct JobId;
}

define_id! {
    /// Name of a configured runner identity (may host many per agent).
    pub struct RunnerName;
}

/// Generates ids for locally-originated entities (builds keyed internally,
/// correlation ids for log lines, etc). Production uses UUIDv4; tests use a
/// sequential generator so assertions don't need to match against randomness.
pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::IdGen;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    pub struct SequentialIdGen {
        prefix: String,
        counter: Arc<AtomicU64>,
    }

    impl SequentialIdGen {
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                counter: Arc::new(AtomicU64::new(1)),
            }
        }
    }

    impl IdGen for SequentialIdGen {
        fn next(&self) -> String {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            format!("{}-{}", self.prefix, n)
        }
    }
}
