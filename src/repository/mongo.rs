use bson::doc;
use mongodb::options::{ClientOptions, Credential, IndexOptions, ResolverConfig};
use mongodb::{Client, Database, IndexModel};
use secrecy::ExposeSecret;
use tracing::info;

use crate::config::MongoConfig;

pub const USERS: &str = "users";
pub const CATEGORIES: &str = "categories";
pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";

/// Builds one pooled client and returns the configured database.
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("StorefrontBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let Some(credentials) = &config.credentials {
        client_options.credential = Some(
            Credential::builder()
                .username(credentials.username.clone())
                .password(credentials.password.expose_secret().to_string())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    info!(database = %config.database, "MongoDB client created");
    Ok(client.database(&config.database))
}

/// Unique indexes backing the email and slug invariants.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let unique = IndexOptions::builder().unique(true).build();

    db.collection::<bson::Document>(USERS)
        .create_index(
            IndexModel::builder().keys(doc! { "email": 1 }).options(unique.clone()).build(),
            None,
        )
        .await?;
    db.collection::<bson::Document>(CATEGORIES)
        .create_index(
            IndexModel::builder().keys(doc! { "slug": 1 }).options(unique).build(),
            None,
        )
        .await?;

    info!("MongoDB indexes ensured");
    Ok(())
}

/// Timestamp format shared by every collection.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
