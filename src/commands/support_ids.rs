use crate::error::{Error, Result};
use crate::models::ServerRecord;
use serenity::all::Message;
use serenity::prelude::*;

/// Support answer ids in ascending order.
pub fn list(server: &ServerRecord) -> Vec<String> {
    let mut ids: Vec<String> = server.support_answers.keys().cloned().collect();
    ids.sort();
    ids
}

fn listing(ids: &[String]) -> Result<String> {
    if ids.is_empty() {
        return Err(Error::NoSupportIds);
    }
    Ok(format!("```\n{}\n```", ids.join("\n")))
}

pub async fn handle_support_ids_command(
    ctx: &Context,
    msg: &Message,
    server: &ServerRecord,
) -> Result<()> {
    let reply = listing(&list(server))?;
    msg.reply(ctx, reply).await?;
    Ok(())
}
