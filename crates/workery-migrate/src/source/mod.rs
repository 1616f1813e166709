//! Legacy PostgreSQL readers.
//!
//! One reader per legacy table. Each runs a single fixed projection, orders
//! by legacy id ascending and returns plain records with optional fields.

pub mod attachment;
pub mod common;
pub mod identifier;
pub mod order;
pub mod pool;
pub mod principal;
pub mod reference;
pub mod row;
pub mod tenant;
pub mod tls;

pub use attachment::*;
pub use common::{LegacyAddress, LegacyAudit, LegacyLink, LegacyPerson};
pub use order::*;
pub use pool::{LegacyPool, QUERY_TIMEOUT};
pub use principal::*;
pub use reference::*;
pub use row::{FromLegacyRow, TextOrCode};
pub use tenant::*;
