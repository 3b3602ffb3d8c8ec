use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedsync::api::{FeedApi, HttpFeedApi};
use feedsync::cli::{self, Commands};
use feedsync::config;
use feedsync::feed::{FeedFilter, FeedSynchronizer};
use feedsync::invite::{autocomplete::no_match_message, InviteSearch};
use feedsync::jobs;
use feedsync::models::{EntityId, Timestamp};
use feedsync::notification::TerminalView;

type TerminalFeed = FeedSynchronizer<Arc<HttpFeedApi>, TerminalView<std::io::Stdout>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "feedsync=info".into()),
    );
    if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let args = cli::Cli::parse();
    let api = Arc::new(HttpFeedApi::from_config(&cfg)?);
    let feed = Arc::new(FeedSynchronizer::new(
        api.clone(),
        TerminalView::new(std::io::stdout()),
        cfg.view(),
    ));

    match args.command.unwrap_or(Commands::Watch { unread: false }) {
        Commands::Watch { unread } => watch(feed, &cfg, unread).await,
        Commands::List => feed.refresh().await.map(|_| ()).map_err(Into::into),
        Commands::Read { id } => {
            load_then(&feed, |feed| async move {
                feed.mark_read(&EntityId(id)).await.map(|_| ())
            })
            .await
        }
        Commands::ReadAll { before } => {
            load_then(&feed, |feed| async move {
                let flipped = match before {
                    Some(ts) => feed.mark_all_read_before(Timestamp(ts)).await?,
                    None => feed.mark_all_read().await?,
                };
                println!("{} notification(s) marked as read", flipped);
                Ok(())
            })
            .await
        }
        Commands::Accept { id } => {
            load_then(&feed, |feed| async move {
                feed.resolve_invitation(&EntityId(id), true).await.map(|_| ())
            })
            .await
        }
        Commands::Refuse { id } => {
            load_then(&feed, |feed| async move {
                feed.resolve_invitation(&EntityId(id), false).await.map(|_| ())
            })
            .await
        }
        Commands::Delete { id } => api
            .delete_notification(&EntityId(id))
            .await
            .map_err(Into::into),
        Commands::Search {
            path,
            project,
            term,
        } => search(api, &cfg, path, project, term).await,
    }
}

/// Initial load, then one action against the loaded feed.
async fn load_then<F, Fut>(feed: &Arc<TerminalFeed>, action: F) -> anyhow::Result<()>
where
    F: FnOnce(Arc<TerminalFeed>) -> Fut,
    Fut: std::future::Future<Output = Result<(), feedsync::errors::AppError>>,
{
    feed.refresh().await?;
    action(feed.clone()).await?;
    Ok(())
}

async fn watch(feed: Arc<TerminalFeed>, cfg: &config::Config, unread: bool) -> anyhow::Result<()> {
    if unread {
        feed.set_filter(FeedFilter::UnreadOnly);
    }

    tracing::info!(
        base_url = %cfg.base_url,
        every_secs = cfg.poll_interval.as_secs(),
        "watching notifications"
    );
    let poller = jobs::poller::spawn(feed.clone(), cfg.poll_interval);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, stopping");
            feed.unmount();
        }
        res = poller => {
            if let Err(e) = res {
                anyhow::bail!("poller task failed: {}", e);
            }
        }
    }
    Ok(())
}

async fn search(
    api: Arc<HttpFeedApi>,
    cfg: &config::Config,
    path: String,
    project: String,
    term: String,
) -> anyhow::Result<()> {
    let search = InviteSearch::new(api, path, project).with_debounce(cfg.debounce);
    match search.on_input(&term).await? {
        Some(list) if list.is_empty() => println!("{}", no_match_message(&term)),
        Some(list) => {
            for s in list.items() {
                let marker = if s.disabled { "-" } else { "+" };
                println!("{} {} ({})", marker, s.label, s.detail);
            }
        }
        None => {}
    }
    Ok(())
}
