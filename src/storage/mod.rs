mod memory;
mod schema;
mod slots;
mod store;
mod types;

pub use memory::MemoryStore;
pub use schema::Database;
pub use store::SlotStore;
pub use types::{DatabaseError, SlotInfo};
