//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. CORS for the local front end
//! 2. `Cache-Control: no-store` on every response
//! 3. Access logger

pub mod access_log;
