pub mod cables;
pub mod game;
pub mod interaction;
pub mod state;
pub mod timers;

pub use cables::{Cable, CableAssignment, generate_cables, shuffle};
pub use game::Game;
pub use interaction::{DragState, GestureOutcome, InteractionHandler};
pub use state::{
    ConfigError, Connection, FailFlash, GameConfig, GameEvent, GameState, LossReason, MIN_CABLES,
    RoundPhase, Session,
};
pub use timers::{Scheduler, TimerHandle, TimerKind};
