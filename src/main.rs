use covid_dash::{
    compare::StateBoard,
    config::StateFeed,
    router,
    source::FeedSource,
    AppState, Config, SeriesRepository,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let profile = config.profile;
    let source_name = profile.kind.name();

    let source = FeedSource::new(source_name.clone(), config.location, profile.format);
    info!(source = %source_name, location = %source.location(), "using feed");

    let repository = SeriesRepository::new(
        Arc::new(source),
        profile.date_field,
        profile.derived,
        config.stale_after,
    )
    .with_retry_after(config.retry_after);

    let compare_start = config
        .states
        .first()
        .map_or(profile.default_start, |feed| feed.profile.default_start);
    let states: Vec<(String, SeriesRepository)> = config
        .states
        .into_iter()
        .map(|feed| state_repository(feed, config.stale_after, config.retry_after))
        .collect();
    let board = StateBoard::new(states, compare_start);

    // warm the snapshots; the server still starts if an upstream is down
    if let Err(err) = repository.refresh().await {
        warn!("initial load failed: {err}");
    }
    for state in board.repositories() {
        if let Err(err) = state.refresh().await {
            warn!(source = state.source_name(), "initial load failed: {err}");
        }
    }

    let state =
        AppState::new(repository, profile.catalog, profile.default_start).with_states(board);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn state_repository(
    feed: StateFeed,
    stale_after: Duration,
    retry_after: Duration,
) -> (String, SeriesRepository) {
    let profile = feed.profile;
    let source = FeedSource::new(profile.kind.name(), feed.location, profile.format);
    info!(state = %feed.code, location = %source.location(), "comparing state");

    let repository =
        SeriesRepository::new(Arc::new(source), profile.date_field, profile.derived, stale_after)
            .with_retry_after(retry_after);
    (feed.code, repository)
}
