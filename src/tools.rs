#[macro_export]
macro_rules! println_stderr {
    ($fmt:expr) => ({
        use std::io::Write as _;
        match writeln!(&mut ::std::io::stderr(), $fmt) {
            Ok(_) => {}
            Err(e) => println!("write to stderr failed: {:?}", e)
        }
    });
    ($fmt:expr, $($arg:tt)*) => ({
        use std::io::Write as _;
        match writeln!(&mut ::std::io::stderr(), $fmt, $($arg)*) {
            Ok(_) => {}
            Err(e) => println!("write to stderr failed: {:?}", e)
        }
    });
}

/// C `atoi`: optional leading whitespace and sign, then as many digits as
/// there are. Anything unparsable yields 0.
pub fn atoi(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i32 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i32);
    }
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}
