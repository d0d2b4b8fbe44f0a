use std::env;
use std::process;

fn main() {
    draftroom::logging::init();
    let args: Vec<String> = env::args().collect();
    process::exit(draftroom::cli::run_with_args(&args));
}
