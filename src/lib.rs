pub mod config;
pub mod deploy;
pub mod errors;
pub mod frontend;
pub mod process;
pub mod server;
pub mod shell;
pub mod ui;
pub mod util;
