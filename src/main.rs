// src/main.rs

use parbuild::{cli, logging, run, LOAD_ERROR_EXIT_CODE};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("parbuild error: {err:?}");
            LOAD_ERROR_EXIT_CODE
        }
    };
    std::process::exit(code);
}

async fn run_main() -> parbuild::errors::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
