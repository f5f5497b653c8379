//! Parabench command-line entry point

fn main() {
    if let Err(e) = parabench_cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
