//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → dispatch.rs (first matching route, 404 / 405)
//!     → middleware/ (named route middleware, e.g. xhr)
//!     → handler.rs (HandlerTable → RouteHandler)
//!     → response.rs (error responses)
//! ```

pub mod dispatch;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{DispatchError, Dispatcher, Resolution};
pub use handler::{HandlerTable, PreviewHandler, RouteContext, RouteHandler};
pub use middleware::{MiddlewareRegistry, RouteMiddleware};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{DispatcherSlot, HttpServer, ServerError};
