// Playback module - archived-link lookup across archive services

pub mod archivers;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod traits;
pub mod utils;

pub use config::{Endpoints, PlaybackConfig};
pub use errors::PlaybackError;
pub use models::{Address, Destination, Provider, ResultSet, Scope};
pub use orchestrator::Resolver;
pub use traits::{LinkSearch, Playback};
