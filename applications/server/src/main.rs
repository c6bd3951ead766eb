/// vidshelf Server - playlist engine over HTTP
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidshelf_core::PlaylistId;
use vidshelf_server::{api, build_state, config::ServerConfig};
use vidshelf_storage::playlists;

#[derive(Parser)]
#[command(name = "vidshelf-server")]
#[command(about = "vidshelf media library server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "VIDSHELF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Verify one playlist's ordering and print its videos
    CheckPlaylist {
        /// Playlist id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vidshelf_server=info,vidshelf_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::CheckPlaylist { id } => check_playlist(config, &id).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting vidshelf server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let pool = vidshelf_storage::create_pool(
        &config.storage.database_url,
        config.storage.max_connections,
    )
    .await?;
    vidshelf_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let app_state = build_state(pool, config.sync.workers);
    Arc::clone(&app_state.channel_sync).start();
    tracing::info!(
        "Channel sync queue started with {} workers",
        config.sync.workers
    );

    let app = api::create_router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn check_playlist(config: ServerConfig, id: &str) -> anyhow::Result<()> {
    let pool = vidshelf_storage::create_pool(&config.storage.database_url, 1).await?;
    vidshelf_storage::run_migrations(&pool).await?;

    let playlist_id = PlaylistId::new(id);
    let mut conn = pool.acquire().await?;
    let detail = playlists::get_detail(&mut conn, &playlist_id).await?;

    println!("{} ({} videos)", detail.playlist.name, detail.total_videos);
    for (position, video_id) in detail.video_ids.iter().enumerate() {
        let marker = if detail.current_position() == Some(position as u32) {
            '>'
        } else {
            ' '
        };
        println!("{} {:>4}  {}", marker, position, video_id);
    }

    playlists::check_invariants(&mut conn, &playlist_id).await?;
    println!("ok: positions are contiguous and the cursor is in range");

    Ok(())
}
