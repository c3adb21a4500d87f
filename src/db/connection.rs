use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("DATABASE_NAMESPACE").unwrap_or_else(|_| "identity".to_string()),
            database: env::var("DATABASE_NAME").unwrap_or_else(|_| "gate".to_string()),
            username: env::var("DATABASE_USERNAME").ok(),
            password: env::var("DATABASE_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

/// Define the `user` table and its lookup indexes.
///
/// Email and phone indexes are deliberately non-unique: registration checks
/// for duplicates with two separate counts instead.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = [
        "DEFINE TABLE IF NOT EXISTS user SCHEMALESS;",
        "DEFINE INDEX IF NOT EXISTS user_user_id ON TABLE user COLUMNS user_id UNIQUE;
         DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email;
         DEFINE INDEX IF NOT EXISTS user_phone_number ON TABLE user COLUMNS phone_number;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();

        ensure_schema(&db).await.unwrap();
        ensure_schema(&db).await.unwrap();
    }
}
