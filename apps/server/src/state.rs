use cde_module_source::{HttpModuleSource, ModuleSource};
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    config::Config,
    db::{MemoryRegistryStore, PostgresRegistryStore, Registry, RegistryStore},
    services::{
        ElementService, ElementSetService, ImageService, IndexCodeService, ModuleService,
        OrganizationService, PersonService, ReferenceService, SpecialtyService,
    },
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Clone)]
pub struct AppStateOptions {
    pub storage: StorageKind,
    pub run_migrations: bool,
    /// Overrides the source built from `module_source.base_url`.
    pub module_source: Option<Arc<dyn ModuleSource>>,
}

impl AppStateOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = config
            .storage
            .backend
            .parse::<StorageKind>()
            .map_err(Error::Internal)?;
        Ok(Self {
            storage,
            run_migrations: config.database.run_migrations,
            module_source: None,
        })
    }

    /// Seeded in-memory storage, no database.
    pub fn in_memory() -> Self {
        Self {
            storage: StorageKind::Memory,
            run_migrations: false,
            module_source: None,
        }
    }

    pub fn with_module_source(mut self, source: Arc<dyn ModuleSource>) -> Self {
        self.module_source = Some(source);
        self
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: Option<PgPool>,
    pub registry: Registry,
    pub set_service: Arc<ElementSetService>,
    pub element_service: Arc<ElementService>,
    pub organization_service: Arc<OrganizationService>,
    pub person_service: Arc<PersonService>,
    pub index_code_service: Arc<IndexCodeService>,
    pub reference_service: Arc<ReferenceService>,
    pub image_service: Arc<ImageService>,
    pub specialty_service: Arc<SpecialtyService>,
    pub module_service: Arc<ModuleService>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let options = AppStateOptions::from_config(&config)?;
        Self::new_with_options(config, options).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!(storage = ?options.storage, "Initializing application state...");

        let config = Arc::new(config);

        let (store, db_pool): (Arc<dyn RegistryStore>, Option<PgPool>) = match options.storage {
            StorageKind::Postgres => {
                let pool = create_db_pool(config.as_ref()).await?;
                if options.run_migrations {
                    tracing::info!("Running database migrations...");
                    sqlx::migrate!("./migrations")
                        .run(&pool)
                        .await
                        .map_err(|e| Error::Internal(format!("Migration failed: {e}")))?;
                }
                (
                    Arc::new(PostgresRegistryStore::new(pool.clone())),
                    Some(pool),
                )
            }
            StorageKind::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown");
                (Arc::new(MemoryRegistryStore::seeded()), None)
            }
        };
        let registry = Registry::new(store);

        let module_source = match options.module_source {
            Some(source) => Some(source),
            None => build_module_source(config.as_ref())?,
        };
        if module_source.is_none() {
            tracing::info!("No module source configured; import from source is disabled");
        }

        let settings = Arc::new(config.registry.clone());

        Ok(Self {
            set_service: Arc::new(ElementSetService::new(registry.clone(), settings.clone())),
            element_service: Arc::new(ElementService::new(registry.clone(), settings.clone())),
            organization_service: Arc::new(OrganizationService::new(
                registry.clone(),
                settings.clone(),
            )),
            person_service: Arc::new(PersonService::new(registry.clone(), settings.clone())),
            index_code_service: Arc::new(IndexCodeService::new(registry.clone(), settings.clone())),
            reference_service: Arc::new(ReferenceService::new(registry.clone(), settings.clone())),
            image_service: Arc::new(ImageService::new(registry.clone(), settings.clone())),
            specialty_service: Arc::new(SpecialtyService::new(registry.clone(), settings.clone())),
            module_service: Arc::new(ModuleService::new(
                registry.clone(),
                settings,
                module_source,
            )),
            config,
            db_pool,
            registry,
        })
    }
}

fn build_module_source(config: &Config) -> Result<Option<Arc<dyn ModuleSource>>> {
    let Some(base_url) = config.module_source.base_url.as_deref() else {
        return Ok(None);
    };
    let source = HttpModuleSource::new(
        base_url,
        config.module_source.api_key.clone(),
        config.module_source.timeout_seconds,
    )?;
    tracing::info!(base_url = source.base_url(), "Module source configured");
    Ok(Some(Arc::new(source)))
}

async fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.database.statement_timeout_seconds;
    let lock_timeout = config.database.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(config.database_url())
        .await
        .map_err(Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.database.pool_min_size,
        config.database.pool_max_size
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_kind_parses_case_insensitively() {
        assert_eq!("Memory".parse::<StorageKind>(), Ok(StorageKind::Memory));
        assert_eq!(" postgres ".parse::<StorageKind>(), Ok(StorageKind::Postgres));
        assert!("sqlite".parse::<StorageKind>().is_err());
    }

    #[tokio::test]
    async fn memory_state_has_reference_data() {
        let state = AppState::new_with_options(Config::default(), AppStateOptions::in_memory())
            .await
            .unwrap();
        assert!(state.db_pool.is_none());
        assert!(!state.index_code_service.systems().await.unwrap().is_empty());
        assert!(!state.specialty_service.get_all().await.unwrap().is_empty());
    }
}
