//! docrepo CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`, which writes the
//! response envelope. On failure the error is echoed to stderr and the
//! process exits non-zero.

use docrepo::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
