//! Journal records and their durable store.

pub mod record;
pub mod store;

pub use record::{Clip, EmotionPoint, Record};
pub use store::{RecordStore, StoreError};
