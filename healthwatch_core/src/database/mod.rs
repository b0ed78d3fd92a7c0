pub mod connection;
pub mod migrations;
pub mod models;
pub mod repository;

pub use connection::get_database_pool;
pub use migrations::{run_migrations, MigrationManager, MigrationRecord};
pub use models::DbEndpoint;
pub use repository::EndpointRepository;
