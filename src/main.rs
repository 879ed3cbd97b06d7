#[tokio::main]
async fn main() {
    if let Err(e) = dentadesk_lib::run().await {
        eprintln!("dentadesk: {e}");
        std::process::exit(1);
    }
}
