pub mod command_log;
pub mod inputs;
pub mod progress;
