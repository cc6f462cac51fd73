pub mod app;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod derive;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod population;
pub mod profile;
pub mod repository;
pub mod resolver;
pub mod source;
pub mod state;
pub mod stats;
pub mod table;

pub use app::router;
pub use config::Config;
pub use repository::SeriesRepository;
pub use state::AppState;
pub use table::TimeSeriesTable;
