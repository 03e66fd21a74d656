//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is open.
//!
//! # Tasks
//! - Stale sweep: Removes entries that outlived their TTL at configured
//!   intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
