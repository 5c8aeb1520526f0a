//! DEP API Client
//!
//! A transparently-authenticated client for the Apple DEP APIs. Per DEP
//! name it signs `/session` with the stored OAuth1 credentials, caches the
//! returned session token in memory, injects `X-ADM-Auth-Session` on every
//! call, re-authenticates once on 401, and exposes the DEP endpoints as
//! typed methods.

mod account;
mod beta;
mod client;
mod device;
mod enrollment;
mod error;
mod oauth1;
mod profile;
mod session;

pub use client::*;
pub use error::*;
pub use oauth1::authorization_header;
