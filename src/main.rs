use log::error;
use std::env;
use std::process::ExitCode;

use dishlens::{Dishlens, DishlensError};

fn usage() -> &'static str {
    "Usage:\n  dishlens analyze <image-path>     Turn a dish photo into a recipe\n  dishlens article <topic> [...]    Generate one article per topic"
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.split_first() {
        Some((command, rest)) => run(command, rest).await,
        None => {
            eprintln!("{}", usage());
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &str, args: &[String]) -> Result<(), DishlensError> {
    let dishlens = Dishlens::builder().build()?;

    match command {
        "analyze" => {
            let path = args.first().ok_or_else(|| {
                DishlensError::Builder("analyze requires an image path".to_string())
            })?;
            let recipe = dishlens.analyze_image_file(path).await?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
            Ok(())
        }
        "article" => {
            if args.is_empty() {
                return Err(DishlensError::Builder(
                    "article requires at least one topic".to_string(),
                ));
            }
            let results = dishlens.write_articles(args.to_vec()).await;
            let mut failed = 0;
            for result in results {
                match result {
                    Ok(article) => println!("{}", serde_json::to_string_pretty(&article)?),
                    Err(e) => {
                        failed += 1;
                        eprintln!("Error: {e}");
                    }
                }
            }
            if failed > 0 {
                return Err(DishlensError::Provider(format!(
                    "{failed} article(s) failed to generate"
                )));
            }
            Ok(())
        }
        _ => Err(DishlensError::Builder(format!(
            "unknown command '{command}'\n{}",
            usage()
        ))),
    }
}
