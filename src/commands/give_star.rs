use crate::Bot;
use crate::commands::target_user;
use crate::error::{Error, Result};
use crate::models::{ServerRecord, UserRecord};
use crate::store::RecordStore;
use crate::utils::embed_field_text;
use log::info;
use serenity::all::{CreateEmbed, CreateEmbedFooter, CreateMessage, Message, UserId};
use serenity::prelude::*;

/// Moves one star from `giver` to `receiver`. Staff keep their own balance.
/// Nothing is touched when the giver cannot pay.
pub fn give(giver: &mut UserRecord, receiver: &mut UserRecord, giver_is_exempt: bool) -> Result<()> {
    if !giver_is_exempt && giver.number_of_stars <= 0 {
        return Err(Error::InsufficientBalance);
    }

    if !giver_is_exempt {
        giver.number_of_stars -= 1;
    }
    giver.given_stars += 1;
    receiver.number_of_stars += 1;
    receiver.received_stars += 1;

    Ok(())
}

/// Loads both records, applies [`give`] and persists them.
pub async fn transfer_star(
    records: &dyn RecordStore,
    giver_id: UserId,
    receiver_id: UserId,
    giver_is_exempt: bool,
) -> Result<(UserRecord, UserRecord)> {
    if giver_id == receiver_id {
        return Err(Error::SelfStar);
    }

    let mut giver = records.get_user(giver_id).await?;
    let mut receiver = records.get_user(receiver_id).await?;

    give(&mut giver, &mut receiver, giver_is_exempt)?;

    records.put_users(&[&giver, &receiver]).await?;

    Ok((giver, receiver))
}

fn is_staff(msg: &Message, server: &ServerRecord) -> bool {
    match (server.staff_role_id, msg.member.as_ref()) {
        (Some(role_id), Some(member)) => member.roles.contains(&role_id),
        _ => false,
    }
}

pub async fn handle_give_star_command(
    ctx: &Context,
    bot: &Bot,
    msg: &Message,
    args: &[&str],
    server: &ServerRecord,
) -> Result<()> {
    let member = target_user(ctx, msg, args)
        .await
        .ok_or(Error::NoMemberMentioned)?;

    let exempt = is_staff(msg, server);
    let (giver, receiver) =
        transfer_star(bot.records.as_ref(), msg.author.id, member.id, exempt).await?;

    info!(
        "{} gave a gold star to {} (staff: {}), receiver now has {}",
        msg.author.id, member.id, exempt, receiver.number_of_stars
    );

    let mut embed = CreateEmbed::new()
        .title("⭐ NEW GOLDEN STAR ⭐")
        .description(format!(
            "<@{}> received a golden star from <@{}> for a total of {}",
            member.id, msg.author.id, receiver.number_of_stars
        ))
        .color(0xF1C40F);

    let reason = args.get(1..).unwrap_or_default().join(" ");
    if !reason.is_empty() {
        embed = embed.field("Reason", embed_field_text(&reason), false);
    }

    let embed = embed.footer(CreateEmbedFooter::new(format!(
        "{} has given {} stars so far",
        msg.author.name, giver.given_stars
    )));

    msg.channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_store;

    const GIVER: UserId = UserId::new(1);
    const RECEIVER: UserId = UserId::new(2);

    fn record(id: UserId, stars: i64) -> UserRecord {
        UserRecord {
            number_of_stars: stars,
            ..UserRecord::new(id)
        }
    }

    #[test]
    fn empty_balance_is_refused_without_changes() {
        let mut giver = record(GIVER, 0);
        let mut receiver = record(RECEIVER, 1);

        let result = give(&mut giver, &mut receiver, false);

        assert!(matches!(result, Err(Error::InsufficientBalance)));
        assert_eq!(giver, record(GIVER, 0));
        assert_eq!(receiver, record(RECEIVER, 1));
    }

    #[test]
    fn star_moves_from_giver_to_receiver() {
        let mut giver = record(GIVER, 3);
        let mut receiver = record(RECEIVER, 1);

        give(&mut giver, &mut receiver, false).unwrap();

        assert_eq!(giver.number_of_stars, 2);
        assert_eq!(giver.given_stars, 1);
        assert_eq!(receiver.number_of_stars, 2);
        assert_eq!(receiver.received_stars, 1);
    }

    #[test]
    fn staff_give_without_spending() {
        let mut giver = record(GIVER, 0);
        let mut receiver = record(RECEIVER, 0);

        give(&mut giver, &mut receiver, true).unwrap();

        assert_eq!(giver.number_of_stars, 0);
        assert_eq!(giver.given_stars, 1);
        assert_eq!(receiver.number_of_stars, 1);
        assert_eq!(receiver.received_stars, 1);
    }

    #[tokio::test]
    async fn transfer_persists_both_records() {
        let store = memory_store().await;
        store.put_user(&record(GIVER, 3)).await.unwrap();

        let (giver, receiver) = transfer_star(&store, GIVER, RECEIVER, false).await.unwrap();

        assert_eq!(store.get_user(GIVER).await.unwrap(), giver);
        assert_eq!(store.get_user(RECEIVER).await.unwrap(), receiver);
        assert_eq!(giver.number_of_stars, 2);
        assert_eq!(receiver.number_of_stars, 1);
    }

    #[tokio::test]
    async fn failed_transfer_writes_nothing() {
        let store = memory_store().await;

        let result = transfer_star(&store, GIVER, RECEIVER, false).await;

        assert!(matches!(result, Err(Error::InsufficientBalance)));
        assert_eq!(store.get_user(RECEIVER).await.unwrap(), UserRecord::new(RECEIVER));
    }

    #[tokio::test]
    async fn self_star_is_refused() {
        let store = memory_store().await;
        store.put_user(&record(GIVER, 3)).await.unwrap();

        let result = transfer_star(&store, GIVER, GIVER, true).await;

        assert!(matches!(result, Err(Error::SelfStar)));
        assert_eq!(store.get_user(GIVER).await.unwrap(), record(GIVER, 3));
    }
}
