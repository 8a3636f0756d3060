//! Message handling - Command parsing, middleware and dispatch

pub mod dispatcher;
pub mod middleware;
pub mod parser;

pub use dispatcher::{DispatchOutcome, MessageDispatcher, GENERIC_ERROR_NOTICE};
pub use middleware::{
    Context, CooldownMiddleware, LoggingMiddleware, Middleware, MiddlewareChain, Next,
    OwnerOnlyMiddleware, PermissionMiddleware,
};
pub use parser::{tokenize, Invocation, MessageParser};
