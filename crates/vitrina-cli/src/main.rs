//! Vitrina command-line entry point.

use clap::Parser;
use vitrina_cli::app::VitrinaApp;
use vitrina_cli::cli::CliArgs;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let result = match VitrinaApp::from_args("vitrina", &args) {
        Ok(app) => app.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
