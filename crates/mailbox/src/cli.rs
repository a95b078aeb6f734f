//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mailbox_store::Folder;

/// Webmail in the terminal.
#[derive(Debug, Parser)]
#[command(name = "mailbox", version, about)]
pub struct Cli {
    /// Settings file (defaults to the user config directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the service settings.
    Config(ConfigArgs),
    /// Create an account.
    Signup(SignupArgs),
    /// Log in and remember the session.
    Login(LoginArgs),
    /// Forget the session.
    Logout,
    /// Print the logged-in address.
    Whoami,
    /// Send a message.
    Compose(ComposeArgs),
    /// List received mail.
    Inbox,
    /// List sent mail.
    Sent,
    /// Message and unread counts of both folders.
    Status,
    /// Show a message and mark it read.
    Read(MessageArgs),
    /// Delete a message.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Base URL of the document store.
    #[arg(long)]
    pub store_url: Option<String>,
    /// Collection holding every mailbox.
    #[arg(long)]
    pub collection: Option<String>,
    /// Identity provider API key.
    #[arg(long)]
    pub api_key: Option<String>,
    /// Identity provider endpoint.
    #[arg(long)]
    pub identity_url: Option<String>,
}

impl ConfigArgs {
    pub const fn is_empty(&self) -> bool {
        self.store_url.is_none()
            && self.collection.is_none()
            && self.api_key.is_none()
            && self.identity_url.is_none()
    }
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    /// Password again.
    #[arg(long)]
    pub confirm: String,
    /// Accept the terms.
    #[arg(long)]
    pub agree: bool,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Recipient address.
    #[arg(long)]
    pub to: String,
    #[arg(long, default_value = "")]
    pub subject: String,
    /// Body, HTML allowed.
    #[arg(long, default_value = "")]
    pub message: String,
}

#[derive(Debug, Args)]
pub struct MessageArgs {
    /// `inbox` or `sent`.
    #[arg(value_parser = parse_folder)]
    pub folder: Folder,
    /// Message id as shown in the listing.
    #[arg(allow_hyphen_values = true)]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub message: MessageArgs,
    /// Confirm the deletion.
    #[arg(long)]
    pub yes: bool,
}

fn parse_folder(name: &str) -> Result<Folder, String> {
    Folder::from_name(name).ok_or_else(|| format!("unknown folder `{name}`, expected inbox or sent"))
}
