//! Durable next-episode cursor.
//!
//! The cursor is a single integer (>= 1) stored as
//! `{"proximo_episodio": <n>}`. Loading never fails: a missing or damaged
//! file restarts from episode 1. Saving is atomic (temp file, fsync, rename).

mod store;

pub use store::{CursorError, CursorStore, CURSOR_KEY, FIRST_EPISODE};
