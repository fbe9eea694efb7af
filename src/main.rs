fn main() {
    if let Err(err) = famgraph::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
