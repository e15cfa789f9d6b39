use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cache;
mod cli;
mod config;
mod flatten;
mod forum;
mod sanitize;
mod scraper;
mod semantic;
mod sentiment;
mod storage;
#[cfg(test)]
mod tests;
mod web;

use app::AppFactory;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::InitIndex {} => {
            let base_path = AppFactory::get_base_path()?;
            let config = config::Config::load_with(&base_path)?;
            let index = AppFactory::create_index(&config)?;

            if index.ensure_index()? {
                println!("created index {}", index.index_name());
            } else {
                println!("index {} already exists", index.index_name());
            }
            Ok(())
        }

        cli::Command::Scrape {
            keyword,
            exclude_neutral,
            index,
        } => {
            let service = AppFactory::create_app_service()?;
            let report = service.keyword_report(&keyword, exclude_neutral, index)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        cli::Command::Search { query, top_k } => {
            let service = AppFactory::create_app_service()?;
            let report = service.semantic_report(&query, top_k)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        cli::Command::Stats {} => {
            let service = AppFactory::create_app_service()?;
            match service.index_stats() {
                Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
                None => println!("index statistics unavailable"),
            }
            Ok(())
        }

        cli::Command::Daemon { bind } => {
            let service = AppFactory::create_app_service()?;
            let bind = bind.unwrap_or_else(|| service.context().config().daemon.bind.clone());
            web::start_daemon(service, &bind)
        }
    }
}
