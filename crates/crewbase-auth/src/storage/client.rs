//! Client storage trait.
//!
//! Defines the interface for OAuth client persistence operations.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage operations for OAuth 2.0 clients.
///
/// # Example
///
/// ```ignore
/// use crewbase_auth::storage::ClientStorage;
///
/// async fn example(storage: &impl ClientStorage) {
///     if let Some(client) = storage.find_by_client_id("dispatch-portal").await? {
///         println!("Found client: {}", client.name);
///     }
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by its OAuth client_id.
    ///
    /// Returns `None` if the client doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Create a new client.
    ///
    /// The client is validated before creation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client validation fails
    /// - A client with the same client_id already exists
    /// - The storage operation fails
    async fn create(&self, client: &Client) -> AuthResult<Client>;

    /// Update an existing client.
    ///
    /// # Errors
    ///
    /// Returns an error if the client doesn't exist or validation fails.
    async fn update(&self, client_id: &str, client: &Client) -> AuthResult<Client>;

    /// Delete a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the client doesn't exist.
    async fn delete(&self, client_id: &str) -> AuthResult<()>;

    /// List all clients.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of clients to return
    /// * `offset` - Number of clients to skip for pagination
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self, limit: i64, offset: i64) -> AuthResult<Vec<Client>>;
}
