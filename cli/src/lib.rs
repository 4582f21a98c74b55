pub mod animator;
pub mod commands;
pub mod logging;
pub mod script;
