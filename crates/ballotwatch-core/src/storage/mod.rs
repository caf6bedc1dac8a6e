pub mod rows;
pub mod schema;
pub mod store;

pub use store::{Relation, Store, StoreEvent};
