//! Plain-text rendering of client state for the terminal.

use chrono::Local;

use oceanchat_api::{Message, MessageRole, ModelEntry, Session};

pub fn message(msg: &Message) {
    let speaker = match msg.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    };
    println!("{speaker}> {}", msg.content);
    if !msg.attachments.is_empty() {
        for attachment in &msg.attachments {
            let name = attachment.filename.as_deref().unwrap_or(&attachment.id);
            match attachment.size_bytes {
                Some(size) => println!("    [attachment] {name} ({size} bytes)"),
                None => println!("    [attachment] {name}"),
            }
        }
    }
    if msg.role == MessageRole::Assistant {
        if let Some(model) = &msg.model {
            println!("    [model: {model}]");
        }
    }
}

pub fn sessions(sessions: &[Session], current: Option<&str>) {
    if sessions.is_empty() {
        println!("No sessions yet.");
        return;
    }
    for session in sessions {
        let marker = if current == Some(session.session_id.as_str()) {
            "*"
        } else {
            " "
        };
        let title = session.title.as_deref().unwrap_or("Untitled chat");
        let updated = session
            .updated_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M");
        println!("{marker} {}  {title}  ({updated})", session.session_id);
    }
}

pub fn models(provider: &str, healthy: bool, models: &[ModelEntry], selected: Option<&str>) {
    let health = if healthy { "healthy" } else { "unavailable" };
    if provider.is_empty() {
        println!("Provider: — ({health})");
    } else {
        println!("Provider: {provider} ({health})");
    }
    if models.is_empty() {
        println!("No models advertised.");
        return;
    }
    for model in models {
        let marker = if selected == Some(model.name.as_str()) {
            "*"
        } else {
            " "
        };
        if model.is_available() {
            println!("{marker} {} \u{2022} {}", model.name, model.provider);
        } else {
            println!(
                "{marker} {} \u{2022} {} ({})",
                model.name, model.provider, model.status
            );
        }
    }
}
