pub mod optimistic;
pub mod reactions;
pub mod threads;
