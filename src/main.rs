use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use concert_booking::{config::Config, AppContext};

mod commands;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = commands::Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if let Some(base_url) = cli.base_url.clone() {
        config.api.base_url = base_url;
    }

    // Логи в stderr, чтобы не мешать выводу команд
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    if config.app.environment == "production" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    info!("Concert booking client ({}) -> {}", config.app.environment, config.api.base_url);

    let ctx = match AppContext::new(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to initialize client: {}", e);
            std::process::exit(2);
        }
    };

    // Сессию восстанавливаем молча: без токена просто гость.
    if let Err(e) = ctx.session.restore().await {
        error!("Failed to restore session: {}", e);
    }

    let result = commands::run(&ctx, cli.command).await;

    for notification in ctx.notifier.drain() {
        println!("[{}] {}", notification.kind.as_str(), notification.message);
    }

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
