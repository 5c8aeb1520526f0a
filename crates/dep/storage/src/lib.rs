//! DEP Storage
//!
//! Persistence contracts for everything depgate keeps per DEP name:
//! OAuth1 tokens, client config, the syncer cursor, the assigner profile
//! UUID, and the staging/current token-PKI slots. Backends implement the
//! narrow capability traits; consumers depend on the composed
//! [`AllStorage`].

mod error;
mod file;
mod inmem;
mod pagination;
mod sqlite;
mod traits;

pub use error::*;
pub use file::*;
pub use inmem::*;
pub use pagination::*;
pub use sqlite::*;
pub use traits::*;

mod schema;

#[cfg(test)]
mod battery;
