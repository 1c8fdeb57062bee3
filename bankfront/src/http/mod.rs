//! HTTP layer: Axum router, route gate, page loaders and form actions.
//!
//! Pages return their data as JSON for the renderer; actions answer with a 303
//! redirect or an [`ActionFailure`](responses::ActionFailure) carrying the
//! accounts service status.

mod error;
mod gate;
mod handlers;
mod responses;
mod state;


pub use handlers::router;
pub use state::AppState;
