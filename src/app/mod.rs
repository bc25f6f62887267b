//! The `listen` service: a live bot reading chat traffic from stdin.

mod console;

pub use console::{AdminRequest, ConsoleInput, ConsoleTransport};

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::bot::MeetBot;
use crate::config::Config;
use crate::meeting::MeetingRegistry;

/// The single channel the console stands in for.
#[derive(Debug, Clone)]
pub struct ListenOptions {
    pub channel: String,
    pub network: String,
}

pub async fn run_listen(config: Config, options: ListenOptions) -> Result<()> {
    info!(
        "Listening for {} on {} (one line per message on stdin)",
        options.channel, options.network
    );

    let mut bot = MeetBot::new(
        Arc::new(config),
        Arc::new(ConsoleTransport),
        MeetingRegistry::new(),
    )?;

    let (tx, mut rx) = mpsc::channel::<String>(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => handle_line(&mut bot, &options, &line),
                None => {
                    info!("Input closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    if !bot.registry().is_empty() {
        info!("Unfinished meetings: {}", bot.list_meetings());
    }
    Ok(())
}

/// Process one console line to completion.
pub fn handle_line(bot: &mut MeetBot, options: &ListenOptions, line: &str) {
    let Some(input) = ConsoleInput::parse(line) else {
        if !line.trim().is_empty() {
            debug!("Ignoring unrecognized input: {:?}", line);
        }
        return;
    };

    let (channel, network) = (options.channel.as_str(), options.network.as_str());
    match input {
        ConsoleInput::Channel { nick, text, is_op } => {
            if let Err(e) = bot.handle_channel_line(channel, network, &nick, &text, is_op, None) {
                error!("Failed to process line from {}: {}", nick, e);
            }
        }
        ConsoleInput::Private { nick, text } => bot.handle_private_message(&nick, &text),
        ConsoleInput::Topic(topic) => bot.set_channel_topic(channel, network, &topic),
        ConsoleInput::Admin(request) => {
            let reply = match request {
                AdminRequest::List => Ok(bot.list_meetings()),
                AdminRequest::SaveAll => Ok(bot.save_all()),
                AdminRequest::Recent => Ok(bot.recent()),
                AdminRequest::Chair(nick) => bot.add_chair(channel, network, &nick),
                AdminRequest::Delete { save } => bot.delete_meeting(channel, network, save),
            };
            match reply {
                Ok(message) => println!("{}", message),
                Err(e) => eprintln!("{}", e),
            }
        }
    }
}
