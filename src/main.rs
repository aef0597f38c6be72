fn main() {
    if let Err(e) = statgrid::app::run_cli() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
