use anyhow::Result;
use clap::Parser;
use parley::api::ApiClient;
use parley::app::{self, App};
use parley::cli::{Cli, Commands};
use parley::config::Config;
use parley::ui::{DialoguerPresenter, TerminalView};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = Config::load_or_init()?;
    let server_url = cli
        .server
        .clone()
        .unwrap_or_else(|| config.server_url.clone());
    let api = ApiClient::new(&server_url);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Users => {
            for user in api.list_users().await? {
                println!("{}  {} (@{})", user.id, user.display_name, user.username);
            }
        }
        Commands::Sessions { user } => {
            for session in api.list_sessions(&user).await? {
                println!(
                    "{}  {}  ({} | {})",
                    session.id, session.title, session.model, session.permission_mode
                );
            }
        }
        Commands::Chat => {
            let theme = config.theme;
            let mut app = App::new(
                api,
                config,
                Box::new(TerminalView::new(theme)),
                Box::new(DialoguerPresenter::new(theme)),
            );
            if let Err(error) = app.bootstrap().await {
                // Fatal to startup: rendered as the sole conversation
                // content, nothing else runs.
                app.surface_bootstrap_failure(&error);
                std::process::exit(1);
            }
            app::run(&mut app).await?;
        }
    }
    Ok(())
}
