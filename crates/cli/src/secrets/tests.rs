//! Tests for the secret resolvers

use super::*;
use async_trait::async_trait;
use malloy_conn_core::{Error, Result};
use malloy_conn_lookup::SecretResolver;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FixedResolver {
    value: Option<&'static str>,
    fail: bool,
    calls: AtomicUsize,
}

impl FixedResolver {
    fn new(value: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            value,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            value: None,
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SecretResolver for FixedResolver {
    async fn resolve(&self, key: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::secret_resolution(key, "locked"));
        }
        Ok(self.value.map(str::to_string))
    }
}

#[test]
fn test_env_var_naming() {
    assert_eq!(
        env_var_for_key("MALLOY_SECRET_", "pg-password"),
        "MALLOY_SECRET_PG_PASSWORD"
    );
    assert_eq!(
        env_var_for_key("P_", "connections.bq/key"),
        "P_CONNECTIONS_BQ_KEY"
    );
}

#[tokio::test]
#[serial]
async fn test_env_resolver_reads_variable() {
    std::env::set_var("MALLOY_SECRET_TEST_TOKEN", "abc123");
    let resolved = EnvSecretResolver::new().resolve("test-token").await.unwrap();
    std::env::remove_var("MALLOY_SECRET_TEST_TOKEN");

    assert_eq!(resolved.as_deref(), Some("abc123"));
}

#[tokio::test]
#[serial]
async fn test_env_resolver_unset_and_empty() {
    std::env::remove_var("MALLOY_SECRET_ABSENT_KEY");
    assert_eq!(
        EnvSecretResolver::new().resolve("absent-key").await.unwrap(),
        None
    );

    std::env::set_var("MALLOY_SECRET_EMPTY_KEY", "");
    let resolved = EnvSecretResolver::new().resolve("empty-key").await.unwrap();
    std::env::remove_var("MALLOY_SECRET_EMPTY_KEY");
    assert_eq!(resolved, None);
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_resolver_appends_key() {
    let resolver = CommandResolver::new(
        "sh",
        vec!["-c".to_string(), "printf 'value-for-%s\\n' \"$0\"".to_string()],
    );

    let resolved = resolver.resolve("warehouse").await.unwrap();

    assert_eq!(resolved.as_deref(), Some("value-for-warehouse"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_resolver_nonzero_exit_is_unset() {
    let resolver = CommandResolver::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
    assert_eq!(resolver.resolve("k").await.unwrap(), None);

    let silent = CommandResolver::new("sh", vec!["-c".to_string(), "true".to_string()]);
    assert_eq!(silent.resolve("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_command_resolver_missing_program_is_error() {
    let resolver = CommandResolver::new("malloy-conn-no-such-program", Vec::new());

    let err = resolver.resolve("k").await.unwrap_err();

    assert!(matches!(err, Error::SecretResolution { .. }));
}

#[test]
fn test_command_line_must_not_be_empty() {
    assert!(CommandResolver::from_command_line(&[]).is_err());
    assert!(CommandResolver::from_command_line(&["pass".to_string(), "show".to_string()]).is_ok());
}

#[tokio::test]
async fn test_chain_first_value_wins() {
    let unset = FixedResolver::new(None);
    let first = FixedResolver::new(Some("first"));
    let second = FixedResolver::new(Some("second"));
    let chain = ChainResolver::new()
        .with(unset.clone())
        .with(first.clone())
        .with(second.clone());

    assert_eq!(chain.resolve("k").await.unwrap().as_deref(), Some("first"));
    assert_eq!(unset.calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chain_skips_failing_resolver() {
    let chain = ChainResolver::new()
        .with(FixedResolver::failing())
        .with(FixedResolver::new(Some("fallback")));

    assert_eq!(
        chain.resolve("k").await.unwrap().as_deref(),
        Some("fallback")
    );
    assert_eq!(ChainResolver::new().resolve("k").await.unwrap(), None);
}
