pub mod analytics;
pub mod cart;
pub mod chat;
pub mod common;
pub mod forum;
pub mod geo;
pub mod group;
pub mod inventory;
pub mod marketplace;
pub mod notification;
pub mod order;
pub mod partner;
pub mod payment;
pub mod profile;
pub mod sensor;
pub mod service;
pub mod sync;
pub mod system;
pub mod traceability;
pub mod user_context;

pub use analytics::*;
pub use cart::*;
pub use chat::*;
pub use common::*;
pub use forum::*;
pub use geo::*;
pub use group::*;
pub use inventory::*;
pub use marketplace::*;
pub use notification::*;
pub use order::*;
pub use partner::*;
pub use payment::*;
pub use profile::*;
pub use sensor::*;
pub use service::*;
pub use sync::*;
pub use system::*;
pub use traceability::*;
pub use user_context::*;
