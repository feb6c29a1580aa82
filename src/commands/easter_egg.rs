//! Easter egg command - Hidden sanity check of the command dispatch

/// Message printed by the easter egg command
pub fn message(with_flag: bool) -> &'static str {
    if with_flag {
        "Let's run easter egg with -a"
    } else {
        "Let's run easter egg."
    }
}

pub fn execute(with_flag: bool) {
    println!("{}", message(with_flag));
}
