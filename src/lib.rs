//! tsh is a tiny Unix shell: a lexer, a parser and a fork/exec executor.
//!
//! Here is how to use tsh as a library:
//!
//! ```no_run
//! use tsh::os::UnixOs;
//! use tsh::shell::Shell;
//!
//! let tokens = tsh::tokenize("cat < in.txt | wc -l > out.txt");
//! assert_eq!(tokens.len(), 8);
//!
//! let cmd = tsh::parse_command(&tokens);
//! assert!(!cmd.has_errors());
//!
//! let mut sh = Shell::new();
//! let mut os = UnixOs;
//! let status = tsh::run_command(&mut sh, &mut os, &cmd);
//! assert_eq!(status, 0);
//! ```
//!
#[macro_use]
pub mod tlog;
#[macro_use]
pub mod tools;

pub mod builtins;
pub mod core;
pub mod diag;
pub mod execute;
pub mod line;
pub mod os;
pub mod parsers;
pub mod shell;
pub mod types;

pub use crate::core::run_command;
pub use crate::parsers::lexer::tokenize;
pub use crate::parsers::parser_cmd::{parse_command, parse_pipeline, parse_simple_command};
pub use crate::shell::get_command;
