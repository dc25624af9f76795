//! Startup seeding.
//!
//! Creates the initial operator account and client registrations from
//! configuration. Existing records are left untouched, so restarting with
//! the same configuration is idempotent.

use std::sync::Arc;

use crewbase_auth::password::hash_password;
use crewbase_auth::storage::{ClientStorage, User, UserStorage};
use crewbase_auth::types::Client;
use crewbase_core::Role;

use crate::config::BootstrapConfig;

/// Seeds the operator account and client registrations.
///
/// # Errors
///
/// Returns an error if a storage operation fails. Already-existing records
/// are skipped, not errors.
pub async fn seed(
    user_storage: &Arc<dyn UserStorage>,
    client_storage: &Arc<dyn ClientStorage>,
    bootstrap: &BootstrapConfig,
) -> anyhow::Result<()> {
    if let Some(admin) = &bootstrap.admin {
        if user_storage.find_by_email(&admin.email).await?.is_none() {
            let user = User::builder(&admin.email, Role::SuperAdmin)
                .name("Platform Operator")
                .password_hash(hash_password(&admin.password)?)
                .build();
            user_storage.create(&user).await?;
            tracing::info!(email = %admin.email, "Seeded operator account");
        }
    }

    for entry in &bootstrap.clients {
        if client_storage
            .find_by_client_id(&entry.client_id)
            .await?
            .is_some()
        {
            continue;
        }

        let client = Client {
            client_id: entry.client_id.clone(),
            client_secret_hash: None,
            name: entry.name.clone(),
            description: entry.description.clone(),
            logo_url: entry.logo_url.clone(),
            redirect_uris: entry.redirect_uris.clone(),
            scopes: entry.scopes.clone(),
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        };
        client_storage.create(&client).await?;
        tracing::info!(client_id = %entry.client_id, "Seeded client registration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BootstrapAdmin, BootstrapClient};
    use crewbase_auth::storage::memory::{InMemoryClientStorage, InMemoryUserStorage};

    fn bootstrap_config() -> BootstrapConfig {
        BootstrapConfig {
            admin: Some(BootstrapAdmin {
                email: "ops@crewbase.dev".to_string(),
                password: "operator-password".to_string(),
            }),
            clients: vec![BootstrapClient {
                client_id: "dispatch-portal".to_string(),
                name: "Dispatch Portal".to_string(),
                description: None,
                logo_url: None,
                redirect_uris: vec!["https://dispatch.example.com/callback".to_string()],
                scopes: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn test_seed_creates_admin_and_clients() {
        let users: Arc<dyn UserStorage> = Arc::new(InMemoryUserStorage::new());
        let clients: Arc<dyn ClientStorage> = Arc::new(InMemoryClientStorage::new());

        seed(&users, &clients, &bootstrap_config()).await.unwrap();

        let admin = users
            .find_by_email("ops@crewbase.dev")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::SuperAdmin);
        assert!(users.verify_password(admin.id, "operator-password").await.unwrap());

        let client = clients
            .find_by_client_id("dispatch-portal")
            .await
            .unwrap()
            .unwrap();
        assert!(client.active);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let users: Arc<dyn UserStorage> = Arc::new(InMemoryUserStorage::new());
        let clients: Arc<dyn ClientStorage> = Arc::new(InMemoryClientStorage::new());
        let config = bootstrap_config();

        seed(&users, &clients, &config).await.unwrap();
        seed(&users, &clients, &config).await.unwrap();

        assert_eq!(clients.list(10, 0).await.unwrap().len(), 1);
    }
}
