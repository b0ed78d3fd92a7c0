pub mod settings;

pub use settings::{AppConfig, CorsConfig, DashboardConfig, DatabaseConfig, ProbeConfig, ServerConfig};
