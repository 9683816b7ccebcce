//! Instagram Downloader - HTTP service entry point.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use instagram_downloader::{
    api::{AuthContext, InstagramApi, SessionProvider},
    cli::Args,
    config::{validate_config, Config},
    error::{exit_codes, Error, Result},
    output::{print_banner, print_config_summary, print_error, print_info, print_success, print_warning},
    server,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}

fn exit_code_for(error: &Error) -> i32 {
    match error {
        Error::Config(_)
        | Error::ConfigValidation { .. }
        | Error::MissingConfig(_)
        | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
        Error::Io(_) => exit_codes::SERVER_ERROR,
        _ => exit_codes::UNEXPECTED_ERROR,
    }
}

/// `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).with_target(false).init();
}

/// Read the config file, or fall back to defaults when it does not exist.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(path);
    }

    print_warning(&format!("No config file at {}", path.display()));
    print_info("Running with defaults, CLI flags and environment");
    Ok(Config::default())
}

fn describe_session(auth: &AuthContext) -> String {
    match (auth.is_authenticated(), auth.username()) {
        (true, Some(username)) => format!("logged in as {}", username),
        (true, None) => "authenticated".to_string(),
        (false, _) => "anonymous".to_string(),
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    print_banner();

    let mut config = load_config(&args.config)?;
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    // One attempt at startup; the context is immutable afterwards
    let provider = SessionProvider::from_config(&config);
    print_info(&format!(
        "Login chain: {}",
        provider.strategy_names().join(" -> ")
    ));
    let auth = provider.establish().await;

    let session = describe_session(&auth);
    if auth.is_authenticated() {
        print_success(&format!("Session ready ({})", session));
    } else {
        print_warning("No Instagram session, requests will be anonymous");
    }

    let api = InstagramApi::new(&config, auth)?;

    print_config_summary(
        &config.server.bind,
        &session,
        &config.workspace_root().display().to_string(),
    );

    server::serve(&config, api).await
}
