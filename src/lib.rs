pub mod error;
pub mod flags;
pub mod logging;
pub mod platform;
pub mod shell;

pub mod core;
pub mod highlight;
pub mod llm;
pub mod path;
pub mod process;
pub mod session;

#[cfg(test)]
mod testing;
