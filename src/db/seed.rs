//! Accounts and stores for an in-memory directory, read from a JSON file.
//!
//! ```json
//! {
//!   "users": [{ "name": "Ada", "email": "ada@example.com", "role": "store_owner" }],
//!   "stores": [{ "name": "Ada's", "email": "shop@example.com", "ownerEmail": "ada@example.com" }]
//! }
//! ```

use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use crate::{db::MemoryDirectory, errors::AppError, models::Role};

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStore {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub stores: Vec<SeedStore>,
}

impl Seed {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json)
            .map_err(|e| AppError::InvalidArgument(format!("Invalid seed data: {e}")))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::InvalidArgument(format!("Cannot read seed file {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

impl MemoryDirectory {
    /// Creates every seeded user, then every store. Store owners are matched
    /// by email and must carry the `store_owner` role.
    pub async fn seed(&self, seed: &Seed) -> Result<(), AppError> {
        let mut ids_by_email = HashMap::with_capacity(seed.users.len());
        for user in &seed.users {
            let email = user.email.to_lowercase();
            if ids_by_email.contains_key(&email) {
                return Err(AppError::Conflict(format!(
                    "Seed lists {} more than once",
                    user.email
                )));
            }
            let created = self.create_user(&user.name, &user.email, user.role).await;
            ids_by_email.insert(email, created.id);
        }

        for store in &seed.stores {
            let owner_id = match &store.owner_email {
                Some(email) => Some(
                    ids_by_email
                        .get(&email.to_lowercase())
                        .copied()
                        .ok_or_else(|| {
                            AppError::NotFound(format!(
                                "Owner {email} of {} is not a seeded user",
                                store.name
                            ))
                        })?,
                ),
                None => None,
            };
            self.create_store(
                &store.name,
                &store.email,
                store.address.as_deref(),
                owner_id,
            )
            .await?;
        }

        tracing::info!(
            "Seeded {} users and {} stores",
            seed.users.len(),
            seed.stores.len()
        );
        Ok(())
    }
}
