//! Service registry for dependency injection and lifecycle management.
//!
//! The registry holds all services, initializes them in order, and handles
//! ordered shutdown.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use tl_core::config::ConfigHandle;
use tl_core::error::{TlError, TlResult};
use tl_models::Database;

use crate::directory::{SqliteDirectory, UserDirectory};
use crate::event_bus::EventBus;
use crate::inbox::InboxService;
use crate::message::MessageStore;
use crate::notification::NotificationDispatcher;
use crate::read_state::ReadStateTracker;
use crate::service::{Service, ServiceState};

/// Central service registry that manages all application services.
///
/// Provides dependency injection by holding shared references to core
/// infrastructure (database, directory, config, event bus) and managing
/// service lifecycle in the correct order.
pub struct ServiceRegistry {
    /// Application configuration.
    pub config: ConfigHandle,
    /// Database connection pool.
    pub database: Database,
    /// User directory for sender and receiver resolution.
    pub directory: Arc<dyn UserDirectory>,
    /// Application-level event bus.
    pub event_bus: EventBus,
    /// Registered services in initialization order.
    services: Vec<(String, Arc<RwLock<Box<dyn Service>>>)>,
}

impl ServiceRegistry {
    /// Create a new ServiceRegistry with core infrastructure.
    pub fn new(config: ConfigHandle, database: Database) -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(SqliteDirectory::new(database.clone()));
        Self {
            config,
            database,
            directory,
            event_bus: EventBus::new(256),
            services: Vec::new(),
        }
    }

    /// Register a service. Services are initialized in registration order.
    pub fn register<S: Service + 'static>(&mut self, service: S) {
        let name = service.name().to_string();
        info!("registered service: {name}");
        self.services
            .push((name, Arc::new(RwLock::new(Box::new(service)))));
    }

    /// Register all default services in the correct dependency order.
    ///
    /// Initialization order:
    /// 1. MessageStore (database, directory, event_bus)
    /// 2. NotificationDispatcher (database, event_bus)
    /// 3. ReadStateTracker (database, event_bus)
    /// 4. Inbox (composes the above)
    pub fn register_all(&mut self) {
        let bus = self.event_bus.clone();

        self.register(MessageStore::new(
            self.database.clone(),
            self.directory.clone(),
            bus.clone(),
        ));

        self.register(NotificationDispatcher::new(
            self.database.clone(),
            bus.clone(),
        ));

        self.register(ReadStateTracker::new(self.database.clone(), bus.clone()));

        self.register(InboxService::new(
            self.database.clone(),
            self.directory.clone(),
            bus,
            self.config.clone(),
        ));

        info!("registered {} default services", self.services.len());
    }

    /// Initialize all registered services in order.
    pub async fn init_all(&self) -> TlResult<()> {
        info!("initializing {} services", self.services.len());

        for (name, service) in &self.services {
            info!("initializing service: {name}");
            let mut svc = service.write().await;
            if let Err(e) = svc.init() {
                error!("failed to initialize service {name}: {e}");
                return Err(TlError::ServiceInit(format!("{name}: {e}")));
            }
        }

        info!("all services initialized");
        Ok(())
    }

    /// Shut down all services in reverse order.
    pub async fn shutdown_all(&self) -> TlResult<()> {
        info!("shutting down services");

        for (name, service) in self.services.iter().rev() {
            info!("shutting down service: {name}");
            let mut svc = service.write().await;
            if let Err(e) = svc.shutdown() {
                error!("error shutting down service {name}: {e}");
                // Continue shutting down other services
            }
        }

        info!("all services shut down");
        Ok(())
    }

    /// Get a reference to the event bus.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Get the health status of all services.
    pub async fn health_check(&self) -> Vec<(String, ServiceState, bool)> {
        let mut results = Vec::new();
        for (name, service) in &self.services {
            let svc = service.read().await;
            results.push((name.clone(), svc.state(), svc.is_healthy()));
        }
        results
    }

    /// Get the number of registered services.
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}
