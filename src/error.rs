use serenity::all::Permissions;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No member mentioned.")]
    NoMemberMentioned,
    #[error("Please mention a valid member")]
    InvalidMember,
    #[error("No logs found for that user.")]
    NoEntries,
    #[error("No support ids for this server")]
    NoSupportIds,
    #[error("This server has no support channel configured.")]
    NoSupportChannel,
    #[error("Incorrect syntax! Use `{usage}`")]
    NotEnoughArgs { usage: String },
    #[error("Incorrect syntax! Use `{usage}`")]
    TooManyArgs { usage: String },
    #[error("You must have the \"{0}\" permission to use this command.")]
    MissingPermission(Permissions),
    #[error("You must have the \"{0}\" role to use this command.")]
    MissingRole(&'static str),
    #[error("Unable. You have no gold stars to give.")]
    InsufficientBalance,
    #[error("You can't give yourself a star.")]
    SelfStar,

    #[error("discord error: {0}")]
    Serenity(#[from] serenity::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("record encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the display text is meant for the user who ran the command.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::Serenity(_) | Self::Database(_) | Self::Migrate(_) | Self::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_user_facing() {
        assert!(Error::NoEntries.is_user_facing());
        assert!(Error::InsufficientBalance.is_user_facing());
        assert!(Error::MissingRole("Support Team").is_user_facing());
    }

    #[test]
    fn infrastructure_errors_are_not_user_facing() {
        let json = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(!Error::Json(json).is_user_facing());
        assert!(!Error::Database(sqlx::Error::RowNotFound).is_user_facing());
    }

    #[test]
    fn usage_is_shown_on_bad_syntax() {
        let err = Error::NotEnoughArgs {
            usage: "!logs <user>".to_string(),
        };
        assert_eq!(err.to_string(), "Incorrect syntax! Use `!logs <user>`");
    }
}
