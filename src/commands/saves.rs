use crate::error::{Error, Result};
use crate::models::ServerRecord;
use serenity::all::{ChannelId, Message, Mentionable};
use serenity::prelude::*;

pub fn saves_notice(support_channel: ChannelId) -> String {
    format!(
        "We do our best to retain save integrity with every update however due to the dynamic nature of game development saves might break. If you experience a save problem please let us know in {}\n\n\
         Reminder:\n\
         With the major changes in v0.6 saves before this version will not work. We are sorry for the inconvenience. Use CTRL/TAB to quickly skip through the content you have seen",
        support_channel.mention()
    )
}

pub async fn handle_saves_command(ctx: &Context, msg: &Message, server: &ServerRecord) -> Result<()> {
    let support_channel = server.support_channel().ok_or(Error::NoSupportChannel)?;
    msg.channel_id
        .say(&ctx.http, saves_notice(support_channel))
        .await?;
    Ok(())
}
