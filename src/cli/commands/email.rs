use clap::{Arg, Command};

pub const ARG_MAIL_API_URL: &str = "mail-api-url";
pub const ARG_MAIL_API_TOKEN: &str = "mail-api-token";
pub const ARG_MAIL_FROM: &str = "mail-from";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAIL_API_URL)
                .long(ARG_MAIL_API_URL)
                .help("Mail API endpoint; when unset, emails are logged instead of delivered")
                .env("CERBERO_MAIL_API_URL"),
        )
        .arg(
            Arg::new(ARG_MAIL_API_TOKEN)
                .long(ARG_MAIL_API_TOKEN)
                .help("Bearer token for the mail API")
                .env("CERBERO_MAIL_API_TOKEN")
                .requires(ARG_MAIL_API_URL),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("Sender address for outbound emails")
                .env("CERBERO_MAIL_FROM")
                .default_value("noreply@cerbero.dev"),
        )
}
