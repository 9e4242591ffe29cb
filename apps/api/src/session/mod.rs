// Session lifecycle: submission, rewrite application, reset, export.
// The orchestrator is the only component that mutates session state.

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod store;

pub use orchestrator::Orchestrator;
pub use store::SessionStore;
