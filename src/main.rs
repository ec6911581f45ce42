use bootplane::cli::run_cli;

fn main() -> anyhow::Result<()> {
    // Load .env if present before any configuration is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    run_cli()
}
