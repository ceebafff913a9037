pub mod console;

pub use console::{Console, ConsoleCommand, Flow, parse_line, run_console, write_catalog};
