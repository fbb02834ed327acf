// Application layer: wiring shared by the binaries (preflight, run, exit codes, prompts).

pub mod interactive;
pub mod runner;
