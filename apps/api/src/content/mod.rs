pub mod fallback;
pub mod format;
pub mod generator;
pub mod handlers;
pub mod prompts;
