//! Startup status lines on the terminal.
//!
//! Request-time logging goes through `tracing`; this module only covers what
//! an operator sees while the service boots.

use console::{style, StyledObject};

fn status(tag: StyledObject<&'static str>, message: &str) {
    println!("{:>5} {}", tag, message);
}

pub fn print_info(message: &str) {
    status(style("INFO").cyan().bold(), message);
}

pub fn print_success(message: &str) {
    status(style("OK").green().bold(), message);
}

pub fn print_warning(message: &str) {
    status(style("WARN").yellow().bold(), message);
}

/// Errors go to stderr.
pub fn print_error(message: &str) {
    eprintln!("{:>5} {}", style("ERROR").red().bold(), message);
}

/// Name and version line shown at startup.
pub fn print_banner() {
    println!();
    println!(
        "{} {}",
        style("instagram-downloader").magenta().bold(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!(
        "{}",
        style("Extract, preview and download media from Instagram posts").dim()
    );
    println!();
}

/// Effective settings, printed once the session is established.
pub fn print_config_summary(bind: &str, session: &str, workspace_root: &str) {
    let rows = [
        ("Listening", format!("http://{}", bind)),
        ("Session", session.to_string()),
        ("Workspaces", workspace_root.to_string()),
    ];

    println!();
    for (label, value) in rows {
        println!("  {:<11} {}", style(label).bold(), value);
    }
    println!();
}
