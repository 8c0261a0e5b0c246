fn main() {
    if let Err(err) = delivery_insight::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
