pub mod service;

pub use service::{RealTimeElectionService, Subscription, SyncConfig};
