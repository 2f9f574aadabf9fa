//! `threadline conversation show`: print a stored thread.

use std::path::Path;

use console::style;

use threadline_types::config::AppConfig;
use threadline_types::error::StoreError;

use crate::state::build_store;

pub async fn show(config: &AppConfig, data_dir: &Path, thread_id: &str, json: bool) -> anyhow::Result<()> {
    let store = build_store(config, data_dir).await?;
    let conversation = match store.get_conversation(thread_id).await {
        Ok(c) => c,
        Err(StoreError::NotFound(_)) => {
            anyhow::bail!("No conversation for thread '{thread_id}' in the {} store", store.name())
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        let out = serde_json::json!({
            "thread_id": conversation.thread_id(),
            "channel": conversation.channel(),
            "initiator": conversation.initiator(),
            "messages": conversation.messages(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style("Thread").bold(),
        style(conversation.thread_id()).cyan().bold()
    );
    println!(
        "  {}",
        style(format!(
            "#{} · started by {} · {} messages",
            conversation.channel(),
            conversation.initiator(),
            conversation.len()
        ))
        .dim()
    );
    println!();

    for m in conversation.messages() {
        let who = if conversation.is_from_initiator(m) {
            style(m.from()).green().bold()
        } else {
            style(m.from()).yellow()
        };
        println!(
            "  {} {}  {}",
            style(m.created_at().format("%Y-%m-%d %H:%M:%S")).dim(),
            who,
            m.raw_text()
        );
    }
    println!();
    Ok(())
}
