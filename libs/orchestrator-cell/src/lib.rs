//! Wires C1-C9 into the cyclic scheduling loop (spec.md §4.10, component
//! C10) and exposes the result over the §6 HTTP surface. The teacher's
//! pattern of "each cell owns its router, the app crate merges it in"
//! carries over unchanged: [`router::create_router`] is the whole of this
//! cell's externally observable API for HTTP callers, [`cycle::run`] is the
//! same thing for the CLI.

pub mod cycle;
pub mod error;
pub mod router;
pub mod state;

pub use cycle::{run, HyperparameterOverrides, RunOutcome, RunRequest, DEFAULT_CYCLE_DAYS};
pub use error::OrchestratorError;
pub use state::AppState;
