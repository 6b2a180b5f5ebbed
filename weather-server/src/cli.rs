use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Text};
use tracing::info;
use weather_core::{Config, StoredObservation, WeatherService};
use weather_server::{AppState, urls};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather observation recorder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP endpoint.
    Serve {
        /// Address to listen on, e.g. "127.0.0.1:8000".
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database URL, e.g. "sqlite://weather.db".
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Configure WeatherAPI credentials interactively.
    Configure,

    /// Fetch, store and print current weather for a location.
    Show {
        /// Location name, postcode or coordinates.
        location: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind, database_url } => {
                let mut config = Config::load()?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                if let Some(url) = database_url {
                    config.server.database_url = url;
                }
                serve(config).await
            }
            Command::Configure => {
                // Env overrides must not end up in the saved file.
                configure(Config::load_from(&Config::config_file_path()?)?)
            }
            Command::Show { location } => {
                let config = Config::load()?;
                let service = WeatherService::from_config(&config).await?;
                let stored = service.record_current(Some(&location)).await?;
                print_observation(&stored);
                Ok(())
            }
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let service = WeatherService::from_config(&config).await?;
    let app = urls::router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("WeatherAPI key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let base_url = Text::new("WeatherAPI base URL:")
        .with_default(&config.provider.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    let timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.provider.timeout_secs)
        .prompt()
        .context("Failed to read timeout")?;

    config.set_api_key(api_key);
    config.provider.base_url = base_url;
    config.provider.timeout_secs = timeout_secs;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_observation(stored: &StoredObservation) {
    let o = &stored.observation;
    println!("{}, {}", o.location, o.country);
    println!("  {} °C / {} °F", o.temperature_celsius, o.temperature_fahrenheit);
    println!("  {}", o.description);
    println!("  icon: {}", o.icon_url);
    println!("  stored as #{}", stored.id);
}
