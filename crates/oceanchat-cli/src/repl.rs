use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use oceanchat_api::{Message, MessageRole, UploadKind};
use oceanchat_core::{ChatClient, Draft, SendError, SendOutcome};

use crate::render;

/// Upload ids staged for the next send. Shared with the detached send tasks
/// so a delivered send can consume what it carried.
type StagedAttachments = Arc<Mutex<Vec<String>>>;

pub struct Repl {
    client: ChatClient,
    system_prompt: Option<String>,
    staged: StagedAttachments,
}

impl Repl {
    pub fn new(client: ChatClient, system_prompt: Option<String>) -> Self {
        Self {
            client,
            system_prompt,
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Line-oriented chat loop. Plain input sends a message; `/` commands
    /// drive session, model and attachment state. Sends run detached so the
    /// prompt stays responsive (and `/cancel` reachable) while a request is
    /// in flight.
    pub async fn run(&self) -> Result<()> {
        println!("Connected. Type a message, or /help for commands.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if let Some(command) = line.strip_prefix('/') {
                if !self.handle_command(command).await? {
                    break;
                }
            } else {
                self.dispatch_send(line);
            }
        }
        Ok(())
    }

    /// Returns false when the loop should exit.
    async fn handle_command(&self, command: &str) -> Result<bool> {
        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        match name {
            "quit" | "exit" => return Ok(false),
            "help" => print_help(),
            "new" => {
                self.client.start_new().await;
                println!("Started a new chat.");
            }
            "sessions" => {
                let state = self.client.state().await;
                render::sessions(state.sessions.sessions(), state.sessions.current());
            }
            "open" => {
                if rest.is_empty() {
                    println!("Usage: /open <session-id>");
                } else {
                    self.client.select_session(rest).await;
                    let state = self.client.state().await;
                    if state.timeline.is_empty() {
                        println!("(no history)");
                    }
                    for message in state.timeline.messages() {
                        render::message(message);
                    }
                }
            }
            "models" => {
                let state = self.client.state().await;
                render::models(
                    state.registry.provider(),
                    state.registry.healthy(),
                    state.registry.models(),
                    state.registry.current_selection(),
                );
            }
            "model" => {
                if rest.is_empty() {
                    println!("Usage: /model <name>");
                } else {
                    self.client.select_model(rest).await;
                    let state = self.client.state().await;
                    match state.registry.current_selection() {
                        Some(name) => println!("Model set to {name}."),
                        None => println!("No model named `{rest}`; selection cleared."),
                    }
                }
            }
            "attach" => self.stage_upload(UploadKind::File, rest).await,
            "photo" => self.stage_upload(UploadKind::Photo, rest).await,
            "cancel" => {
                self.client.cancel_inflight().await;
                println!("Cancelled the pending send.");
            }
            other => println!("Unknown command `/{other}`; try /help."),
        }
        Ok(true)
    }

    /// Upload a local file and stage its id for the next send. Failures are
    /// reported directly to the user and nothing is staged.
    async fn stage_upload(&self, kind: UploadKind, path: &str) {
        if path.is_empty() {
            println!("Usage: /{} <path>", command_for(kind));
            return;
        }
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                println!("Upload failed: cannot read {path}: {err}");
                return;
            }
        };
        let filename = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());
        match self.client.upload(kind, &filename, bytes).await {
            Ok(id) => {
                let mut staged = self.staged.lock().unwrap();
                staged.push(id.clone());
                println!("Attached {filename} as {id} ({} staged).", staged.len());
            }
            Err(err) => println!("Upload failed: {err}"),
        }
    }

    /// Fire a send without blocking the input loop; the reply (or the error
    /// bubble) prints when the request resolves.
    fn dispatch_send(&self, message: String) {
        let client = self.client.clone();
        let staged = Arc::clone(&self.staged);
        let draft = Draft {
            message,
            system_prompt: self.system_prompt.clone(),
            attachments: staged.lock().unwrap().clone(),
        };
        println!("(assistant is thinking...)");
        tokio::spawn(async move {
            match client.send(draft).await {
                Ok(SendOutcome::Delivered { .. }) => {
                    staged.lock().unwrap().clear();
                    let state = client.state().await;
                    if let Some(reply) = last_assistant(state.timeline.messages()) {
                        render::message(reply);
                    }
                }
                Ok(SendOutcome::Failed { .. }) => {
                    let state = client.state().await;
                    if let Some(notice) = last_assistant(state.timeline.messages()) {
                        render::message(notice);
                    }
                }
                Err(SendError::Busy) => {
                    println!("A send is already in flight; wait for it or /cancel.")
                }
                Err(SendError::Empty) => println!("Nothing to send."),
            }
        });
    }
}

fn last_assistant(messages: &[Message]) -> Option<&Message> {
    messages.iter().rev().find(|m| m.role == MessageRole::Assistant)
}

fn command_for(kind: UploadKind) -> &'static str {
    match kind {
        UploadKind::File => "attach",
        UploadKind::Photo => "photo",
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /new              start a new chat");
    println!("  /sessions         list chat sessions");
    println!("  /open <id>        open a session and print its history");
    println!("  /models           list available models");
    println!("  /model <name>     select a model");
    println!("  /attach <path>    upload a file for the next message");
    println!("  /photo <path>     upload a photo for the next message");
    println!("  /cancel           abort the pending send");
    println!("  /quit             exit");
}
