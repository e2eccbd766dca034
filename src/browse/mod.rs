pub mod loader;
pub mod navigator;
pub mod routes;
pub mod seasons;

pub use loader::{LoadState, MetadataLoader, RequestSequence, RequestToken, SharedCatalog};
pub use routes::Route;
pub use seasons::SeasonSelector;
