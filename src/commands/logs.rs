use crate::Bot;
use crate::commands::target_user;
use crate::error::{Error, Result};
use crate::models::ServerRecord;
use crate::pagination::{Controls, PageAction, PageView};
use crate::time;
use chrono::{Duration, NaiveDateTime};
use log::{debug, info, warn};
use serenity::all::{
    ButtonStyle, ChannelId, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    EditMessage, Message, MessageId, UserId,
};
use serenity::prelude::*;

/// A posted log listing together with the page its owner is looking at.
pub struct LogSession {
    pub owner: UserId,
    pub channel_id: ChannelId,
    pub title: String,
    pub view: PageView,
    pub last_active: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Someone other than the owner clicked.
    Ignored,
    /// The clicked button was disabled for the current page.
    Unchanged,
    Moved,
}

impl LogSession {
    pub fn new(owner: UserId, channel_id: ChannelId, title: String, view: PageView) -> Self {
        Self {
            owner,
            channel_id,
            title,
            view,
            last_active: time::now(),
        }
    }

    pub fn step(&mut self, actor: UserId, action: PageAction) -> StepOutcome {
        if actor != self.owner {
            return StepOutcome::Ignored;
        }
        if !self.view.apply(action) {
            return StepOutcome::Unchanged;
        }

        self.last_active = time::now();
        StepOutcome::Moved
    }

    pub fn is_expired(&self, timeout: Duration) -> bool {
        time::has_elapsed(&self.last_active, timeout)
    }

    pub fn render(&self) -> (CreateEmbed, Vec<CreateActionRow>) {
        let (text, controls) = self.view.render();
        let embed = CreateEmbed::new()
            .title(&self.title)
            .description(text)
            .color(0xFF0000)
            .footer(CreateEmbedFooter::new(format!(
                "Page {}/{}",
                self.view.current_page(),
                self.view.total_pages()
            )));

        (embed, nav_buttons(controls))
    }
}

fn nav_buttons(controls: Controls) -> Vec<CreateActionRow> {
    let next_button = CreateButton::new(PageAction::Advance.custom_id())
        .label("Next Page")
        .style(ButtonStyle::Primary)
        .disabled(controls.advance_disabled);

    let previous_button = CreateButton::new(PageAction::Retreat.custom_id())
        .label("Previous Page")
        .style(ButtonStyle::Primary)
        .disabled(controls.retreat_disabled);

    vec![CreateActionRow::Buttons(vec![next_button, previous_button])]
}

pub async fn handle_logs_command(
    ctx: &Context,
    bot: &Bot,
    msg: &Message,
    args: &[&str],
    server: &ServerRecord,
) -> Result<()> {
    let user = target_user(ctx, msg, args)
        .await
        .ok_or(Error::InvalidMember)?;

    let view = PageView::open(server.logs_for(user.id))?;
    let session = LogSession::new(
        msg.author.id,
        msg.channel_id,
        format!("Logs for {}", user.name),
        view,
    );

    let (embed, components) = session.render();
    let posted = msg
        .channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(embed).components(components),
        )
        .await?;

    info!(
        "Opened log view {} for user {} ({} pages)",
        posted.id,
        user.id,
        session.view.total_pages()
    );
    bot.log_views.write().await.insert(posted.id, session);

    Ok(())
}

pub async fn handle_logs_page(
    ctx: &Context,
    bot: &Bot,
    component: &ComponentInteraction,
) -> Result<()> {
    let message_id = component.message.id;
    let Some(action) = PageAction::from_custom_id(&component.data.custom_id) else {
        debug!("Unknown log view button {}", component.data.custom_id);
        component
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await?;
        return Ok(());
    };

    let mut views = bot.log_views.write().await;
    if views
        .get(&message_id)
        .is_some_and(|session| session.is_expired(bot.config.log_view_timeout))
    {
        debug!("Log view {} expired", message_id);
        views.remove(&message_id);
    }

    let response = match views.get_mut(&message_id) {
        None => {
            debug!("Click on closed log view {}", message_id);
            CreateInteractionResponse::Acknowledge
        }
        Some(session) => match session.step(component.user.id, action) {
            StepOutcome::Moved => {
                let (embed, components) = session.render();
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(embed)
                        .components(components),
                )
            }
            outcome => {
                debug!(
                    "{:?} click by {} on log view {}",
                    outcome, component.user.id, message_id
                );
                CreateInteractionResponse::Acknowledge
            }
        },
    };

    // Drop the lock before making async calls
    drop(views);

    component.create_response(&ctx.http, response).await?;
    Ok(())
}

/// Removes idle views and returns where their messages live.
pub async fn prune_expired_views(bot: &Bot) -> Vec<(ChannelId, MessageId)> {
    let mut views = bot.log_views.write().await;
    let expired: Vec<(ChannelId, MessageId)> = views
        .iter()
        .filter(|(_, session)| session.is_expired(bot.config.log_view_timeout))
        .map(|(message_id, session)| (session.channel_id, *message_id))
        .collect();

    for (_, message_id) in &expired {
        views.remove(message_id);
    }
    expired
}

/// Drops idle views and strips the buttons from their messages.
pub async fn close_expired_views(ctx: &Context, bot: &Bot) {
    for (channel_id, message_id) in prune_expired_views(bot).await {
        info!("Closing idle log view {}", message_id);
        if let Err(why) = channel_id
            .edit_message(&ctx.http, message_id, EditMessage::new().components(vec![]))
            .await
        {
            warn!("Cannot remove buttons from log view {}: {}", message_id, why);
        }
    }
}
