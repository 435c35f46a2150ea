use crate::os::Os;
use crate::shell::Shell;
use crate::tools::atoi;

/// `exit [n]`: terminate the shell process right away.
pub fn run(_sh: &mut Shell, os: &mut dyn Os, args: &[String]) -> i32 {
    let code = args.get(1).map(|x| atoi(x)).unwrap_or(0);
    log!("exit {}", code);
    os.exit(code)
}
