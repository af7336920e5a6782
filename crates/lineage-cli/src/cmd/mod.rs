pub mod ancestors;
pub mod completions;
pub mod cycles;
pub mod find;
pub mod resolve;
pub mod sheets;
pub mod source;
