mod canvas;
mod color;
mod dispatch;
mod frame;
mod palette;
mod routes;
mod services;
mod state;
mod tools;
mod world;

use services::round::WordBank;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let settings = state::GameSettings::from_env();

    // Word list from file if configured (non-fatal: built-in list otherwise).
    let words = match &settings.words_file {
        Some(path) => match WordBank::from_file(path) {
            Ok(bank) => {
                tracing::info!(path = %path, words = bank.len(), "word list loaded");
                bank
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "word list unreadable, using built-in words");
                WordBank::standard()
            }
        },
        None => WordBank::standard(),
    };

    let state = state::AppState::new(settings, words);

    // Background tickers: round countdown and scoreboard refresh.
    let _round_ticker = services::round::spawn_round_ticker(state.clone());
    let _scoreboard_ticker = services::scoreboard::spawn_scoreboard_ticker(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "drawarena listening");
    axum::serve(listener, app).await.expect("server failed");
}
