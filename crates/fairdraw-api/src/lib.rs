mod error;
mod handlers;
mod server;
mod state;

pub use error::ApiError;
pub use server::create_app;
pub use state::AppState;
