//! Echo relay server binary.
//! Run with: cargo run --bin echo-server

use std::process::ExitCode;

use echo_relay::start_echo_relay;

fn main() -> ExitCode {
    start_echo_relay::run()
}
