//! Binary entrypoint of the AI Studio backend.

use std::process::ExitCode;

use ai_studio::start_ai_studio;

fn main() -> ExitCode {
    start_ai_studio::run()
}
