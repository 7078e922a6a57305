use clap::{Arg, Command};

pub const ARG_APP_ORIGIN: &str = "app-origin";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_REFRESH_THRESHOLD_SECONDS: &str = "session-refresh-threshold-seconds";
pub const ARG_VERIFY_CODE_TTL_SECONDS: &str = "verify-code-ttl-seconds";
pub const ARG_RESET_CODE_TTL_SECONDS: &str = "reset-code-ttl-seconds";
pub const ARG_RESET_WINDOW_SECONDS: &str = "reset-window-seconds";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_APP_ORIGIN)
                .long(ARG_APP_ORIGIN)
                .help("Frontend origin used for CORS and verification links")
                .env("CERBERO_APP_ORIGIN")
                .default_value("http://localhost:5173"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session and refresh token TTL in seconds")
                .env("CERBERO_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SESSION_REFRESH_THRESHOLD_SECONDS)
                .long(ARG_SESSION_REFRESH_THRESHOLD_SECONDS)
                .help("Remaining session lifetime below which a refresh extends the session")
                .env("CERBERO_SESSION_REFRESH_THRESHOLD_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_VERIFY_CODE_TTL_SECONDS)
                .long(ARG_VERIFY_CODE_TTL_SECONDS)
                .help("Email verification code TTL in seconds")
                .env("CERBERO_VERIFY_CODE_TTL_SECONDS")
                .default_value("31536000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_RESET_CODE_TTL_SECONDS)
                .long(ARG_RESET_CODE_TTL_SECONDS)
                .help("Password reset code TTL in seconds")
                .env("CERBERO_RESET_CODE_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_RESET_WINDOW_SECONDS)
                .long(ARG_RESET_WINDOW_SECONDS)
                .help("Window for counting recent password reset requests")
                .env("CERBERO_RESET_WINDOW_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(i64)),
        )
}
