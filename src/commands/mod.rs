pub mod give_star;
pub mod logs;
pub mod saves;
pub mod support_ids;

use crate::Bot;
use crate::error::{Error, Result};
use log::error;
use serenity::all::{GuildId, Message, Permissions, RoleId, User, UserId};
use serenity::utils::parse_user_mention;
use serenity::prelude::*;

// Re-export all command handlers
pub use give_star::handle_give_star_command;
pub use logs::{LogSession, close_expired_views, handle_logs_command, handle_logs_page};
pub use saves::handle_saves_command;
pub use support_ids::handle_support_ids_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Logs,
    Saves,
    GiveStar,
    SupportIds,
}

#[derive(Debug)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub names: &'static [&'static str],
    pub expected_args: &'static str,
    pub min_args: usize,
    pub max_args: Option<usize>,
    pub permission: Option<Permissions>,
    pub required_role: Option<&'static str>,
}

pub static COMMANDS: [CommandSpec; 4] = [
    CommandSpec {
        kind: CommandKind::Logs,
        names: &["logs", "log"],
        expected_args: "<user>",
        min_args: 1,
        max_args: None,
        permission: Some(Permissions::MANAGE_MESSAGES),
        required_role: None,
    },
    CommandSpec {
        kind: CommandKind::Saves,
        names: &["save", "saves"],
        expected_args: "",
        min_args: 0,
        max_args: None,
        permission: None,
        required_role: None,
    },
    CommandSpec {
        kind: CommandKind::GiveStar,
        names: &["give_star", "gs"],
        expected_args: "<user> [text]",
        min_args: 1,
        max_args: None,
        permission: None,
        required_role: None,
    },
    CommandSpec {
        kind: CommandKind::SupportIds,
        names: &["support_ids"],
        expected_args: "",
        min_args: 0,
        max_args: Some(0),
        permission: None,
        required_role: Some("Support Team"),
    },
];

impl CommandSpec {
    pub fn usage(&self, prefix: &str) -> String {
        format!("{}{} {}", prefix, self.names[0], self.expected_args)
            .trim_end()
            .to_string()
    }

    pub fn check_args(&self, prefix: &str, count: usize) -> Result<()> {
        if count < self.min_args {
            return Err(Error::NotEnoughArgs {
                usage: self.usage(prefix),
            });
        }
        if self.max_args.is_some_and(|max| count > max) {
            return Err(Error::TooManyArgs {
                usage: self.usage(prefix),
            });
        }
        Ok(())
    }
}

pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.names.contains(&name))
}

#[derive(Debug, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub name: String,
    pub args: Vec<&'a str>,
}

pub fn parse_invocation<'a>(prefix: &str, content: &'a str) -> Option<Invocation<'a>> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    // "! logs" is not a command
    if rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_lowercase();

    Some(Invocation {
        name,
        args: tokens.collect(),
    })
}

/// Runs the gates in order (authorization, argument count) and hands the
/// server record to the matching handler.
pub async fn run_command(
    ctx: &Context,
    bot: &Bot,
    msg: &Message,
    guild_id: GuildId,
    spec: &CommandSpec,
    args: &[&str],
) -> Result<()> {
    authorize(ctx, msg, guild_id, spec).await?;
    spec.check_args(&bot.config.prefix, args.len())?;

    let server = bot.records.get_server(guild_id).await?;

    match spec.kind {
        CommandKind::Logs => handle_logs_command(ctx, bot, msg, args, &server).await,
        CommandKind::Saves => handle_saves_command(ctx, msg, &server).await,
        CommandKind::GiveStar => handle_give_star_command(ctx, bot, msg, args, &server).await,
        CommandKind::SupportIds => handle_support_ids_command(ctx, msg, &server).await,
    }
}

async fn authorize(
    ctx: &Context,
    msg: &Message,
    guild_id: GuildId,
    spec: &CommandSpec,
) -> Result<()> {
    if spec.permission.is_none() && spec.required_role.is_none() {
        return Ok(());
    }

    let member = guild_id.member(ctx, msg.author.id).await?;

    // Cache refs are not Send, resolve everything before the next await
    let (permissions, role_id) = match ctx.cache.guild(guild_id) {
        Some(guild) => {
            let channel = guild.channels.get(&msg.channel_id).or_else(|| {
                guild
                    .threads
                    .iter()
                    .find(|thread| thread.id == msg.channel_id)
            });
            let permissions = channel.map(|channel| guild.user_permissions_in(channel, &member));
            let role_id = spec.required_role.and_then(|name| {
                guild
                    .roles
                    .values()
                    .find(|role| role.name == name)
                    .map(|role| role.id)
            });
            (permissions, role_id)
        }
        None => (None, None),
    };

    check_access(spec, permissions, role_id, &member.roles)
}

/// `permissions` are the member's effective permissions in the channel and
/// `role_id` the guild role named by the command, when either is known.
fn check_access(
    spec: &CommandSpec,
    permissions: Option<Permissions>,
    role_id: Option<RoleId>,
    member_roles: &[RoleId],
) -> Result<()> {
    if let Some(required) = spec.permission {
        if !permissions.is_some_and(|granted| granted.contains(required)) {
            return Err(Error::MissingPermission(required));
        }
    }

    if let Some(name) = spec.required_role {
        if !role_id.is_some_and(|id| member_roles.contains(&id)) {
            return Err(Error::MissingRole(name));
        }
    }

    Ok(())
}

/// `<@id>`, `<@!id>` or a raw numeric id.
pub fn parse_target(arg: &str) -> Option<UserId> {
    parse_user_mention(arg).or_else(|| {
        arg.parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(UserId::new)
    })
}

/// The user named by the first argument. Other mentions in the message
/// (reply pings, users named in a reason) never count.
pub async fn target_user(ctx: &Context, msg: &Message, args: &[&str]) -> Option<User> {
    let id = parse_target(args.first()?)?;
    if let Some(user) = msg.mentions.iter().find(|user| user.id == id) {
        return Some(user.clone());
    }

    id.to_user(ctx).await.ok()
}

pub async fn report_error(ctx: &Context, msg: &Message, command: &str, why: &Error) {
    let reply = if why.is_user_facing() {
        why.to_string()
    } else {
        error!("Error executing command {}: {}", command, why);
        "Something went wrong processing your request".to_string()
    };

    if let Err(why) = msg.reply(ctx, reply).await {
        error!("Cannot reply to command {}: {}", command, why);
    }
}
