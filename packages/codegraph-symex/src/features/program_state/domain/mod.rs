//! Program state domain models

pub mod program_state;

pub use program_state::ProgramState;
