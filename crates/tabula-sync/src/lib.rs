//! Tabula Sync - Shareable filter state
//!
//! Mirrors filter values of one or more grids into a flat string map, such as
//! a URL query string, and reads them back when a view is opened from a
//! shared link.
//!
//! - `FilterSyncBridge` - View registry plus the shared filter map
//! - `ExternalStore` / `QueryParams` - Where the string pairs live
//! - `codec` - Filter entry to string pair conversion

mod bridge;
pub mod codec;
mod store;

pub use bridge::FilterSyncBridge;
pub use codec::CodecError;
pub use store::{ExternalStore, QueryParams};
