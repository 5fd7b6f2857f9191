//! Request processing behind the HTTP routes.

pub mod solve;
