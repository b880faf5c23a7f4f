use crate::config::DatabaseConfig;
use crate::models::sensor_fields::{DEVICE_NAME, TIME};
use crate::models::user_fields::{API_KEY, EMAIL};
use crate::models::{SENSOR_COLLECTION, USERS_COLLECTION};
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

/// Pooled handle to the document store. Cloning is cheap and clones share the pool.
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(&config.connection_string).await?;
        client_options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database_name);

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await;

        Ok(mongodb)
    }

    /// Creates the indexes the stores rely on. Failures are logged, not fatal.
    async fn ensure_indexes(&self) {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<Document>(USERS_COLLECTION);
        let unique = || IndexOptions::builder().unique(true).build();

        let indexes = [
            (
                &users,
                IndexModel::builder()
                    .keys(doc! { EMAIL: 1 })
                    .options(unique())
                    .build(),
                "ApiUsers(Email) unique",
            ),
            (
                &users,
                IndexModel::builder()
                    .keys(doc! { API_KEY: 1 })
                    .options(unique())
                    .build(),
                "ApiUsers(ApiKey) unique",
            ),
        ];

        for (collection, index, label) in indexes {
            match collection.create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}", label),
                Err(e) => log::warn!("   ⚠️  Could not create index {}: {}", label, e),
            }
        }

        let readings = self.collection::<Document>(SENSOR_COLLECTION);
        let reading_index = IndexModel::builder()
            .keys(doc! { DEVICE_NAME: 1, TIME: 1 })
            .build();

        match readings.create_index(reading_index).await {
            Ok(_) => log::info!("   ✅ Index created: SensorData(Device Name, Time)"),
            Err(e) => log::warn!("   ⚠️  Could not create index SensorData(Device Name, Time): {}", e),
        }

        log::info!("✅ Database indexes ready");
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
