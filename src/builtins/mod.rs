use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::os::Os;
use crate::shell::Shell;

pub mod cd;
pub mod exit;
pub mod quit;

/// A command the shell runs itself, in the parent process, because it
/// changes shell-wide state.
pub type Builtin = fn(&mut Shell, &mut dyn Os, &[String]) -> i32;

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, Builtin> = {
        let mut table: HashMap<&'static str, Builtin> = HashMap::new();
        table.insert("cd", cd::run);
        table.insert("exit", exit::run);
        table.insert("quit", quit::run);
        table
    };
}

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.get(name).copied()
}
