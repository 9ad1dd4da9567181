//! Built-in services.
//!
//! - [`HelloService`] - `name` in, `greeting` out
//! - [`SummaryService`] - statistics over a `double[]` argument

mod hello;
mod summary;

pub use hello::{HelloService, HelloServiceFactory};
pub use summary::{SummaryService, SummaryServiceFactory};
