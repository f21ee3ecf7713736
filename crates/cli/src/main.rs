fn main() {
    if let Err(e) = srcsync_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
