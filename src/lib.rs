// ============================================================================
// portico - edge API gateway with an asynchronous event pipeline
// ============================================================================
//
// Two halves, composed in two binaries:
//
// - `gateway`: routes client requests to backend services by path prefix,
//   propagates simulated identity headers, and proxies status/body verbatim.
// - `notification-worker`: consumes durable `user_created` events from the
//   broker and dispatches a (simulated) welcome notification.
//
// Backend CRUD services are external collaborators reached over HTTP; the
// broker mediates between them and the worker.
//
// ============================================================================

pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod identity;

pub use config::Config;
pub use error::{ConsumeError, ForwardError, GatewayError, PublishError, RouteError};
