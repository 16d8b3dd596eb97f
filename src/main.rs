use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interview_cards::config::Config;
use interview_cards::deck::Deck;
use interview_cards::state::AppState;

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "interview_cards=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::load();

  // Never serve traffic without a usable deck
  let deck = match Deck::load(&config.deck_path) {
    Ok(deck) => deck,
    Err(e) => {
      tracing::error!("Failed to load deck: {}", e);
      std::process::exit(1);
    }
  };
  tracing::info!("Loaded {} cards from {}", deck.len(), config.deck_path.display());
  tracing::info!("Session logs go to {}", config.log_dir.display());

  let state = AppState::from_config(&config, deck);
  let app = interview_cards::router(state);

  let bind_addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", bind_addr, e));

  tracing::info!("Server running on http://localhost:{}", config.server_port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
