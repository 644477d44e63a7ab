use std::sync::Arc;

use agora_clock::SystemClock;
use agora_engine::{Engine, WriterSink};
use agora_runner::{ListenAddr, RunnerConfig, Server, replay, send_to};
use log::{error, info};
use tokio::io::BufReader;

/// Wait for the event writer to drain once the engine has released the sink
async fn flush_output(writer: tokio::task::JoinHandle<std::io::Stdout>) {
    if let Err(e) = writer.await {
        error!("Event writer failed: {}", e);
    }
}

fn print_help() {
    eprintln!(
        r#"Agora - continuous double-auction matching engine

USAGE:
    agora [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --replay <PATH>     Run the text commands in PATH (or - for stdin) and exit
    --send <ADDR>       Send text commands from stdin to a running server
    --help              Print this help message

COMMANDS:
    B <id> <instrument> <price> <count>    buy
    S <id> <instrument> <price> <count>    sell
    C <id>                                 cancel

ENVIRONMENT VARIABLES:
    AGORA_LISTEN        Listen address, unix:<path> or tcp:<host:port>
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Serve on the default Unix socket
    agora

    # Serve on TCP
    AGORA_LISTEN=tcp:127.0.0.1:7000 agora

    # Replay a file and print the events
    agora --replay orders.txt
"#
    );
}

enum Mode {
    Serve,
    Replay(String),
    Send(String),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut mode = Mode::Serve;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            flag @ ("--config" | "-c" | "--replay" | "-r" | "--send" | "-s") => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: {} requires an argument", flag);
                    std::process::exit(1);
                }
                let value = args[i].clone();
                match flag {
                    "--config" | "-c" => config_path = Some(value),
                    "--replay" | "-r" => mode = Mode::Replay(value),
                    _ => mode = Mode::Send(value),
                }
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            RunnerConfig::from_file(&path)?
        }
        None => RunnerConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Mode::Send(addr) = &mode {
        let addr: ListenAddr = addr.parse()?;
        let stdin = BufReader::new(tokio::io::stdin());
        send_to(&addr, stdin).await?;
        return Ok(());
    }

    let (sink, writer) = WriterSink::spawn(std::io::stdout(), config.output);
    let engine = Engine::new(config.engine.clone(), Arc::new(SystemClock::new()), Arc::new(sink))?;
    info!("{} started", config.name);

    match mode {
        Mode::Replay(path) => {
            let result = if path == "-" {
                replay(&engine, BufReader::new(tokio::io::stdin())).await
            } else {
                let file = tokio::fs::File::open(&path).await?;
                replay(&engine, BufReader::new(file)).await
            };
            // Whatever was submitted is still processed and printed
            engine.shutdown().await?;
            flush_output(writer).await;
            if let Err(e) = result {
                error!("Replay of {} stopped: {}", path, e);
                return Err(e.into());
            }
        }
        Mode::Serve | Mode::Send(_) => {
            let server = Server::bind(&config.listen).await?;
            let connections = server
                .run(engine, async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
            info!("Served {} connections", connections);
            flush_output(writer).await;
        }
    }

    info!("{} stopped", config.name);
    Ok(())
}
