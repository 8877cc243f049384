mod common;
mod config;
mod error;
mod network;
mod ui;

use std::error::Error;
use std::time::Duration;

use clap::{Parser, Subcommand};
use common::{ClientCommand, LocalIdentity};
use dotenvy::dotenv;
use network::{ChannelSink, ChatClient, ClientSettings, WebSocketConnector};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use ui::ChatApp;

use crate::error::ChatError;

/// Thời gian chờ tầng mạng gửi `leave` và đóng kết nối khi thoát.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(
    name = "rust_room_chat",
    version,
    about = "Real-time room chat client"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Chat server `host[:port]` serving `/room`
    #[arg(long, env = "CHAT_HOST")]
    host: Option<String>,
    /// Use `wss://` (server origin is HTTPS)
    #[arg(long)]
    secure: bool,
    /// Display name instead of a random `UserNNN`
    #[arg(long, env = "CHAT_NAME")]
    name: Option<String>,
    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Run in the terminal instead of opening a window
    Console,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(host) = &cli.host {
        app_config.host = host.clone();
    }
    if cli.secure {
        app_config.secure = true;
    }
    if let Some(name) = &cli.name {
        app_config.display_name = Some(name.clone());
    }
    if cli.save_config {
        config::save_config(&cli.config, &app_config)?;
        log::info!("Saved settings to {}", cli.config);
    }

    let settings = app_config.client_settings()?;
    let identity = app_config
        .display_name
        .clone()
        .map(LocalIdentity::new)
        .unwrap_or_else(LocalIdentity::generate);

    match cli.mode {
        Some(Mode::Console) => run_console(settings, identity).await,
        None => run_window(settings, identity).await,
    }
}

fn spawn_client(
    settings: ClientSettings,
    identity: LocalIdentity,
    event_tx: mpsc::UnboundedSender<common::ChatEvent>,
    cmd_rx: mpsc::Receiver<ClientCommand>,
) -> JoinHandle<Result<(), ChatError>> {
    tokio::spawn(async move {
        let client = ChatClient::new(
            settings,
            identity,
            WebSocketConnector,
            ChannelSink::new(event_tx),
            cmd_rx,
        );
        let result = client.run().await;
        match &result {
            Err(err) if err.is_fatal() => log::error!("Chat client cannot run: {err}"),
            Err(err) => log::warn!("Chat client terminated: {err}"),
            Ok(()) => {}
        }
        result
    })
}

async fn run_console(
    settings: ClientSettings,
    identity: LocalIdentity,
) -> Result<(), Box<dyn Error>> {
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let client = spawn_client(settings, identity.clone(), event_tx, cmd_rx);
    let input = ui::console::spawn_stdin_reader();
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("Cannot listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };
    ui::console::run(identity, input, ctrl_c, cmd_tx.clone(), event_rx).await;

    shutdown(cmd_tx, client).await;
    Ok(())
}

async fn run_window(
    settings: ClientSettings,
    identity: LocalIdentity,
) -> Result<(), Box<dyn Error>> {
    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // 2. Khởi chạy Network Thread (Chạy ngầm)
    let client = spawn_client(settings, identity.clone(), event_tx, cmd_rx);

    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let ui_cmd_tx = cmd_tx.clone();

    eframe::run_native(
        "Rust Room Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Window opened for {identity}");

            Ok(Box::new(ChatApp::new(
                cc,
                identity.clone(),
                ui_cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )?;

    shutdown(cmd_tx, client).await;
    Ok(())
}

/// Ask the client to leave the room and wait briefly for it to finish.
async fn shutdown(
    cmd_tx: mpsc::Sender<ClientCommand>,
    client: JoinHandle<Result<(), ChatError>>,
) {
    if cmd_tx.send(ClientCommand::Shutdown).await.is_err() {
        log::debug!("Chat client already stopped");
    }
    match tokio::time::timeout(SHUTDOWN_GRACE, client).await {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => log::error!("Chat client task failed: {err}"),
        Err(_) => log::warn!("Chat client did not stop within {SHUTDOWN_GRACE:?}"),
    }
}
