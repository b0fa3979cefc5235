use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::users::Role;
use crate::services::policy::Caller;

pub mod migrator;
pub mod repositories;

pub use repositories::crop::{Crop, CropInput, CropPatch};
pub use repositories::farmer::{Farmer, FarmerInput, FarmerPatch};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if db_url.starts_with("sqlite:") && !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // A pooled :memory: URL opens one database per connection, so pin the
        // pool to a single connection to keep migrations visible everywhere.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn crop_repo(&self) -> repositories::crop::CropRepository {
        repositories::crop::CropRepository::new(self.conn.clone())
    }

    fn farmer_repo(&self) -> repositories::farmer::FarmerRepository {
        repositories::farmer::FarmerRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
        contact: Option<&str>,
        role: Role,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(display_name, email, password, contact, role, config)
            .await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        display_name: Option<&str>,
        contact: Option<&str>,
        farm_size: Option<f32>,
    ) -> Result<Option<User>> {
        self.user_repo()
            .update_profile(id, display_name, contact, farm_size)
            .await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, config)
            .await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    // ========================================================================
    // Crops
    // ========================================================================

    pub async fn list_crops(&self, caller: &Caller) -> Result<Vec<Crop>> {
        self.crop_repo().list(caller).await
    }

    pub async fn add_crop(&self, input: CropInput) -> Result<Crop> {
        self.crop_repo().add(input).await
    }

    pub async fn get_crop(&self, id: i32) -> Result<Option<Crop>> {
        self.crop_repo().get(id).await
    }

    pub async fn update_crop(&self, id: i32, patch: CropPatch) -> Result<Option<Crop>> {
        self.crop_repo().update(id, patch).await
    }

    pub async fn remove_crop(&self, id: i32) -> Result<bool> {
        self.crop_repo().remove(id).await
    }

    pub async fn count_crops(&self) -> Result<u64> {
        self.crop_repo().count().await
    }

    // ========================================================================
    // Farmers
    // ========================================================================

    pub async fn list_farmers(&self) -> Result<Vec<Farmer>> {
        self.farmer_repo().list().await
    }

    pub async fn get_farmer(&self, id: i32) -> Result<Option<Farmer>> {
        self.farmer_repo().get(id).await
    }

    pub async fn get_farmer_by_email(&self, email: &str) -> Result<Option<Farmer>> {
        self.farmer_repo().get_by_email(email).await
    }

    pub async fn add_farmer(&self, input: FarmerInput) -> Result<Farmer> {
        self.farmer_repo().add(input).await
    }

    pub async fn update_farmer(&self, id: i32, patch: FarmerPatch) -> Result<Option<Farmer>> {
        self.farmer_repo().update(id, patch).await
    }

    pub async fn remove_farmer(&self, id: i32) -> Result<bool> {
        self.farmer_repo().remove(id).await
    }

    pub async fn count_farmers(&self) -> Result<u64> {
        self.farmer_repo().count().await
    }
}
