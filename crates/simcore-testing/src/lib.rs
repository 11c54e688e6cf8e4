//! Testing infrastructure shared by the workspace's integration tests.
//!
//! - `TestWorld`: isolated temp directory seeded with module and
//!   tool-spec fixtures.
//! - `ScriptedAgent`: a deterministic `Agent` driven by a queue of
//!   canned actions.
//! - `assertions`: structural checks over a session transcript.

pub mod assertions;
pub mod scripted_agent;
pub mod world;

pub use scripted_agent::ScriptedAgent;
pub use world::TestWorld;
