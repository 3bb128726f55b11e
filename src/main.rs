use std::process;

fn main() {
    if let Err(e) = coursemap::run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
