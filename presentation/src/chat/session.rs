//! Console chat session
//!
//! Tokens are written as they arrive; the closing line carries the usage of
//! the persisted session.

use crate::output::console::ConsoleFormatter;
use boomerang_application::{Agent, AgentError, AgentPool, ChatStream};
use boomerang_domain::{ChatEvent, ExecutionContext};
use colored::Colorize;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

/// How a single exchange ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEnd {
    Done {
        session_id: Uuid,
        input_tokens: u32,
        output_tokens: u32,
        cost_cents: f64,
        duration_ms: u64,
    },
    Failed(String),
    /// The stream closed without a terminal event
    Interrupted,
}

/// Text streamed during one exchange and how it ended
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub text: String,
    pub end: TurnEnd,
}

/// Chat with one agent of the panel under a fixed context
pub struct ChatSession {
    agent: Agent,
    label: String,
    context: ExecutionContext,
}

impl ChatSession {
    pub fn new(
        pool: &AgentPool,
        agent: &str,
        context: ExecutionContext,
    ) -> Result<Self, AgentError> {
        let agent = pool.get(agent)?.clone();
        let label = ConsoleFormatter::agent_label(agent.name(), pool.registry()).to_string();
        Ok(Self {
            agent,
            label,
            context,
        })
    }

    /// Send one message and stream the answer to `out`
    pub async fn send<W: Write>(&self, message: &str, out: &mut W) -> io::Result<ChatTurn> {
        write!(out, "{}: ", self.label)?;
        out.flush()?;
        let stream = self.agent.chat(message, &self.context);
        Self::render(stream, out).await
    }

    /// Write a chat stream to `out` until it ends
    pub async fn render<W: Write>(mut stream: ChatStream, out: &mut W) -> io::Result<ChatTurn> {
        let mut text = String::new();

        while let Some(event) = stream.next().await {
            match event {
                ChatEvent::Token { content, .. } => {
                    write!(out, "{}", content)?;
                    out.flush()?;
                    text.push_str(&content);
                }
                ChatEvent::Done {
                    session_id,
                    input_tokens,
                    output_tokens,
                    cost_cents,
                    duration_ms,
                    ..
                } => {
                    writeln!(out)?;
                    writeln!(
                        out,
                        "{}",
                        format!(
                            "[{} in / {} out tokens, {:.4} cents, {} ms]",
                            input_tokens, output_tokens, cost_cents, duration_ms
                        )
                        .dimmed()
                    )?;
                    return Ok(ChatTurn {
                        text,
                        end: TurnEnd::Done {
                            session_id,
                            input_tokens,
                            output_tokens,
                            cost_cents,
                            duration_ms,
                        },
                    });
                }
                ChatEvent::Error { error, .. } => {
                    writeln!(out)?;
                    writeln!(out, "{} {}", "Error:".red().bold(), error)?;
                    return Ok(ChatTurn {
                        text,
                        end: TurnEnd::Failed(error),
                    });
                }
            }
        }

        writeln!(out)?;
        Ok(ChatTurn {
            text,
            end: TurnEnd::Interrupted,
        })
    }

    /// Read messages from stdin until EOF or `/quit`
    pub async fn run_interactive(&self) -> io::Result<()> {
        println!(
            "{} {} {}",
            "Chatting with".cyan(),
            self.label,
            "(/quit to leave)".dimmed()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", "you>".green().bold());
            io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            let message = line.trim();
            if message.is_empty() {
                continue;
            }
            if matches!(message, "/quit" | "/exit") {
                break;
            }

            let turn = self.send(message, &mut io::stdout()).await?;
            if let TurnEnd::Failed(error) = &turn.end {
                tracing::warn!("Chat turn failed: {}", error);
            }
        }
        Ok(())
    }
}
