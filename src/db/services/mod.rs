//! Postgres data access, one sub-module per table family. Every function takes
//! a pool or an already-open connection; callers decide transaction scope
//! except where a function documents that it opens its own.

pub mod book_service;
pub mod film_service;
pub mod tag_service;
pub mod user_service;

pub use book_service::*;
pub use film_service::*;
pub use tag_service::*;
pub use user_service::*;
