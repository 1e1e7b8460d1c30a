//! Console chat adapter
//!
//! Drives the daemon from stdin against the in-memory platform. Each line is
//! one command:
//!
//! - `play <member> [target]`: post `$play` (optionally naming another member)
//! - `redeem <code> <member>`: follow an invite
//! - `leave <member>`: leave every voice channel
//! - `say <member> <text>`: post a message to the lobby
//! - `quit`: stop the daemon

use std::sync::Arc;

use huddle_platform::InMemoryPlatform;
use huddle_types::ChannelId;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::DaemonResult;
use crate::handler::{PlayHandler, PlayRequest};

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Play {
        member: String,
        target: Option<String>,
    },
    Redeem {
        code: String,
        member: String,
    },
    Leave {
        member: String,
    },
    Say {
        member: String,
        text: String,
    },
    Quit,
}

impl ConsoleCommand {
    /// Parse one input line; `Ok(None)` for blank lines
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb {
            "play" => {
                let member = words.next().ok_or("usage: play <member> [target]")?;
                Self::Play {
                    member: member.to_string(),
                    target: words.next().map(str::to_string),
                }
            }
            "redeem" => match (words.next(), words.next()) {
                (Some(code), Some(member)) => Self::Redeem {
                    code: code.to_string(),
                    member: member.to_string(),
                },
                _ => return Err("usage: redeem <code> <member>".to_string()),
            },
            "leave" => {
                let member = words.next().ok_or("usage: leave <member>")?;
                Self::Leave {
                    member: member.to_string(),
                }
            }
            "say" => {
                let member = words.next().ok_or("usage: say <member> <text>")?;
                let text = words.collect::<Vec<_>>().join(" ");
                if text.is_empty() {
                    return Err("usage: say <member> <text>".to_string());
                }
                Self::Say {
                    member: member.to_string(),
                    text,
                }
            }
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {}", other)),
        };

        Ok(Some(command))
    }
}

/// Console front end bound to one lobby channel
pub struct Console {
    platform: Arc<InMemoryPlatform>,
    handler: Arc<PlayHandler>,
    lobby: ChannelId,
}

impl Console {
    pub fn new(platform: Arc<InMemoryPlatform>, handler: Arc<PlayHandler>, lobby: ChannelId) -> Self {
        Self {
            platform,
            handler,
            lobby,
        }
    }

    /// Execute a command and return the lines to print
    pub async fn execute(&self, command: ConsoleCommand) -> DaemonResult<Vec<String>> {
        let mut output = Vec::new();

        match command {
            ConsoleCommand::Play { member, target } => {
                let author = self.platform.register_member(&member).await;
                let mut request = PlayRequest::new(author, self.lobby);
                if let Some(target) = target {
                    request = request.for_target(self.platform.register_member(&target).await);
                }

                match self.handler.handle(request).await? {
                    Some(placement) => {
                        output.push(format!("[dm {}] {}", placement.member.name, placement.reply));
                        if let Some(invite) = placement.invite {
                            output.push(format!("invite code: {}", invite.code));
                        }
                    }
                    None => output.push("request ignored".to_string()),
                }
            }
            ConsoleCommand::Redeem { code, member } => {
                let member = self.platform.register_member(&member).await;
                let channel = self.platform.redeem_invite(&code, &member.id).await?;
                output.push(format!("{} joined {}", member.name, channel));
            }
            ConsoleCommand::Leave { member } => {
                let member = self.platform.register_member(&member).await;
                if self.platform.leave(&member.id).await {
                    output.push(format!("{} left voice", member.name));
                } else {
                    output.push(format!("{} was not in voice", member.name));
                }
            }
            ConsoleCommand::Say { member, text } => {
                let member = self.platform.register_member(&member).await;
                self.platform.post(&self.lobby, Some(member.id), &text).await?;
            }
            ConsoleCommand::Quit => {}
        }

        Ok(output)
    }

    /// Read commands until `quit` or end of input
    pub async fn run(&self, mut lines: mpsc::Receiver<String>) -> DaemonResult<()> {
        while let Some(line) = lines.recv().await {
            let command = match ConsoleCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(usage) => {
                    println!("{}", usage);
                    continue;
                }
            };

            if command == ConsoleCommand::Quit {
                info!("Quit requested from console");
                break;
            }

            match self.execute(command).await {
                Ok(output) => output.iter().for_each(|line| println!("{}", line)),
                Err(e) => warn!(error = %e, "Console command failed"),
            }
        }

        Ok(())
    }
}

/// Read stdin on a dedicated thread and forward each line.
///
/// The thread is detached; a read blocked on an idle terminal does not hold
/// up shutdown.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}
