//! Data access for dashboard tables.
//!
//! [`DataStore`] is the backend seam. [`DataSource`] layers an immutable
//! query over a store and hands back [`DataItem`]s that can update or
//! delete themselves. [`MemoryStore`] keeps rows in process.

pub mod item;
pub mod memory;
pub mod source;
pub mod store;

pub use item::DataItem;
pub use memory::MemoryStore;
pub use source::DataSource;
pub use store::DataStore;
