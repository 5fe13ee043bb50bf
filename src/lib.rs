//! Dungeon exploration game engine for a chat-driven dungeon crawl.
//!
//! This crate provides:
//! - A three-room tutorial dungeon with exploration, combat, and looting
//! - Deterministic rules resolvers over an owned world model
//! - Append-only snapshot persistence keyed to chat message ids
//! - A session manager that serializes each session's read-modify-write cycle
//!
//! # Quick Start
//!
//! ```ignore
//! use dungeon_core::{MemorySnapshotStore, Request, SessionConfig, SessionManager};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = SessionManager::new(MemorySnapshotStore::new(), SessionConfig::new());
//!
//!     let session_id = Uuid::new_v4();
//!     let message_id = Uuid::new_v4();
//!     let response = manager
//!         .handle(session_id, message_id, Request::Move { direction: "north".into() })
//!         .await?;
//!     println!("{}", response.message);
//!     Ok(())
//! }
//! ```

pub mod ops;
pub mod persist;
pub mod rules;
pub mod session;
pub mod template;
pub mod testing;
pub mod world;

// Primary public API
pub use ops::{OpResponse, PlayerStatsView, Request, RoomView};
pub use persist::{
    FileSnapshotStore, MemorySnapshotStore, Snapshot, SnapshotId, SnapshotStore, StoreError,
};
pub use rules::{CombatOutcome, EngineError, LootOutcome, MoveOutcome};
pub use session::{SessionConfig, SessionError, SessionManager};
pub use testing::TestHarness;
pub use world::{Direction, GameState, Item, ItemType, Monster, Player, Room, RoomType};
