//! A line client for the Hold'em table server.
//!
//! Reads commands from stdin, sends them as frames and prints every table
//! state and hand result the server pushes back.

use anyhow::{Context, Result};
use holdem_client::{
    commands::{COMMANDS_HELP, Input, parse_command},
    view::TableView,
};
use holdem_table::{
    messages::{ClientMessage, ServerMessage},
    net::errors::SerializationError,
    utils::{read_prefixed, write_prefixed},
};
use pico_args::Arguments;
use std::{io, net::SocketAddr};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::{TcpStream, tcp::OwnedReadHalf},
};

const HELP: &str = "\
Connect to a Hold'em table server

USAGE:
  holdem_client [OPTIONS]

OPTIONS:
  --connect  IP:PORT    Server socket connection address  [default: 127.0.0.1:6969]

FLAGS:
  -h, --help            Print help information
";

struct Args {
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        addr: pargs
            .opt_value_from_str("--connect")?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 6969))),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let stream = TcpStream::connect(args.addr)
        .await
        .with_context(|| format!("Failed to connect to {}", args.addr))?;
    let (reader, mut writer) = stream.into_split();

    let printer = tokio::spawn(print_frames(reader));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if printer.is_finished() {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Input::Table(command)) => {
                write_prefixed(&mut writer, &ClientMessage { command })
                    .await
                    .context("Failed to send command")?;
            }
            Ok(Input::Help) => println!("{COMMANDS_HELP}"),
            Ok(Input::Quit) => break,
            Err(e) => println!("{e}"),
        }
    }

    printer.abort();
    Ok(())
}

/// Print frames until the server hangs up.
async fn print_frames(mut reader: OwnedReadHalf) {
    let mut view = TableView::new();
    loop {
        let message: ServerMessage = match read_prefixed(&mut reader).await {
            Ok(message) => message,
            Err(SerializationError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                println!("Server closed the connection");
                return;
            }
            Err(e) => {
                println!("Connection error: {e}");
                return;
            }
        };
        match view.handle(message) {
            Ok(text) => println!("{text}"),
            Err(e) => println!("Unreadable update: {e}"),
        }
    }
}
