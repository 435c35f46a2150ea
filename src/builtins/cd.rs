use crate::diag::Level;
use crate::os::Os;
use crate::shell::Shell;

pub const DEFAULT_HOME_DIR: &str = "/";

/// `cd [dir]`; a failure is reported but not returned.
pub fn run(_sh: &mut Shell, os: &mut dyn Os, args: &[String]) -> i32 {
    let dir = args.get(1).map(String::as_str).unwrap_or(DEFAULT_HOME_DIR);
    if let Err(e) = os.chdir(dir) {
        os.report(Level::User, &format!("cd: {}: {}", dir, e.desc()));
    }
    0
}
