use ridebuddy::config::Config;
use ridebuddy::engine::Engine;
use ridebuddy::server::serve;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };

    let engine = match Engine::from_config(&config) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to build engine: {}", err);
            std::process::exit(1);
        }
    };

    serve(engine, config.listen_addr).await;
}
