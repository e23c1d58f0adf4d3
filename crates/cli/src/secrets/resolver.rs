//! Secret resolver implementations

use async_trait::async_trait;
use malloy_conn_core::{Error, Result};
use malloy_conn_lookup::SecretResolver;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Prefix of environment variables consulted by [`EnvSecretResolver`]
pub const SECRET_ENV_PREFIX: &str = "MALLOY_SECRET_";

/// Environment variable name for a secret key: upper-cased, with every
/// non-alphanumeric character replaced by `_`
pub fn env_var_for_key(prefix: &str, key: &str) -> String {
    let suffix: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{prefix}{suffix}")
}

/// Resolves secrets from `MALLOY_SECRET_<KEY>` environment variables
#[derive(Debug, Clone)]
pub struct EnvSecretResolver {
    prefix: String,
}

impl EnvSecretResolver {
    pub fn new() -> Self {
        Self::with_prefix(SECRET_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EnvSecretResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretResolver for EnvSecretResolver {
    async fn resolve(&self, key: &str) -> Result<Option<String>> {
        let var = env_var_for_key(&self.prefix, key);
        match std::env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(Error::secret_resolution(
                key,
                format!("{var} is not valid UTF-8"),
            )),
        }
    }
}

/// Resolves a secret by running `cmd args... KEY` and reading stdout.
///
/// A non-zero exit or empty output means the secret is unset; failing to start
/// the command is an error.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    cmd: String,
    args: Vec<String>,
}

impl CommandResolver {
    pub fn new(cmd: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args,
        }
    }

    /// Build from a command line such as `["pass", "show"]`
    pub fn from_command_line(command: &[String]) -> Result<Self> {
        let (cmd, args) = command
            .split_first()
            .ok_or_else(|| Error::configuration("secret command must not be empty"))?;
        Ok(Self::new(cmd.clone(), args.to_vec()))
    }
}

#[async_trait]
impl SecretResolver for CommandResolver {
    async fn resolve(&self, key: &str) -> Result<Option<String>> {
        let output = Command::new(&self.cmd)
            .args(&self.args)
            .arg(key)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::secret_resolution(key, format!("failed to run '{}': {e}", self.cmd))
            })?;

        if !output.status.success() {
            debug!(
                key = %key,
                code = ?output.status.code(),
                "Secret command reported no value"
            );
            return Ok(None);
        }

        let value = String::from_utf8(output.stdout).map_err(|e| {
            Error::secret_resolution(key, format!("command output is not valid UTF-8: {e}"))
        })?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }
}

/// Consults resolvers in order; the first `Some` wins.
///
/// A failing resolver is logged and skipped.
#[derive(Default, Clone)]
pub struct ChainResolver {
    resolvers: Vec<Arc<dyn SecretResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, resolver: Arc<dyn SecretResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }
}

#[async_trait]
impl SecretResolver for ChainResolver {
    async fn resolve(&self, key: &str) -> Result<Option<String>> {
        for resolver in &self.resolvers {
            match resolver.resolve(key).await {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(e) => warn!(key = %key, error = %e, "Secret resolver failed"),
            }
        }
        Ok(None)
    }
}
