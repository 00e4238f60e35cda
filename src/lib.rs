pub mod api;
pub mod app;
pub mod config;
pub mod console;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod markup;
pub mod models;
pub mod state;
pub mod ui;
pub mod workflow;

pub use app::router;
pub use config::Config;
pub use state::AppState;
