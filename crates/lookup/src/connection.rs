use async_trait::async_trait;
use malloy_conn_core::Result;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// A live handle to a queryable backend.
///
/// Connections are created and owned by a `ConnectionFactory`; lookups only
/// hand them out.
pub trait Connection: Debug + Send + Sync {
    /// Name the connection was looked up under
    fn name(&self) -> &str;

    /// Backend discriminator of the entry it was built from
    fn kind(&self) -> &str;

    /// Access to the factory's concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Resolves connections by name
#[async_trait]
pub trait LookupConnection: Send + Sync {
    /// Resolve `name` to a connection.
    ///
    /// # Returns
    /// * `Ok(connection)` - the name is defined and the factory built it
    /// * `Err(Error::NotFound)` - the name is not defined in this lookup
    /// * `Err(_)` - any other failure, typically from the factory
    async fn lookup_connection(&self, name: &str) -> Result<Arc<dyn Connection>>;
}
