fn main() {
    if let Err(e) = touchbridge_lib::run() {
        eprintln!("touchbridge: {e}");
        std::process::exit(1);
    }
}
