//! Search & Chill core: an incremental, scroll-driven loader for paginated
//! movie search results.
//!
//! - [`fetch`]: one page per request against the backend, with bounded fixed-delay retry
//! - [`accumulator`]: the pagination state machine for the active query
//! - [`loader`]: runs the accumulator's fetches and applies completions in order
//! - [`scroll`]: viewport signal and the threshold trigger for the next page
//! - [`query`]: resets the loader when the active query changes

pub mod accumulator;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod query;
pub mod recommend;
pub mod retry;
pub mod scroll;

pub use accumulator::{LoadFailure, LoaderState, Status};
pub use error::{ChillError, Result};
pub use loader::{Loader, LoaderEvent};
