//! Subcommand handlers.

use std::path::PathBuf;

use anyhow::{Result, bail};
use mailbox_core::{
    Draft, FolderView, LoginForm, Session, SessionSlot, SignUpForm, load_counts, log_in, log_out,
    send_mail, sign_up,
};
use mailbox_store::{Folder, MailStore, StoreClient};
use tracing::info;

use crate::cli::{Command, ComposeArgs, ConfigArgs, DeleteArgs, LoginArgs, MessageArgs, SignupArgs};
use crate::render;
use crate::settings::{self, AppSettings};

/// Everything a command needs besides its arguments.
pub struct Context {
    settings_path: PathBuf,
    settings: AppSettings,
    slot: SessionSlot,
}

impl Context {
    /// Load settings from `settings_path` and open the default session slot.
    pub async fn load(settings_path: PathBuf) -> Result<Self> {
        let settings = settings::load_settings(&settings_path).await?;
        Ok(Self {
            settings_path,
            settings,
            slot: settings::session_slot(),
        })
    }

    async fn store_for(&self) -> Result<(Session, StoreClient)> {
        let session = self.slot.require().await?;
        let store = self.settings.store_client(Some(&session))?;
        Ok((session, store))
    }
}

/// Run one subcommand, printing its output.
pub async fn run(ctx: Context, command: Command) -> Result<()> {
    match command {
        Command::Config(args) => configure(ctx, args).await,
        Command::Signup(args) => signup(&ctx, args).await,
        Command::Login(args) => login(&ctx, args).await,
        Command::Logout => {
            log_out(&ctx.slot).await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            match ctx.slot.load().await? {
                Some(session) => println!("{}", session.email),
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Command::Compose(args) => compose(&ctx, args).await,
        Command::Inbox => {
            let (session, store) = ctx.store_for().await?;
            print!("{}", list_folder(store, session, Folder::Inbox).await);
            Ok(())
        }
        Command::Sent => {
            let (session, store) = ctx.store_for().await?;
            print!("{}", list_folder(store, session, Folder::Sent).await);
            Ok(())
        }
        Command::Status => {
            let (session, store) = ctx.store_for().await?;
            print!("{}", render::summary(&load_counts(&store, &session).await));
            Ok(())
        }
        Command::Read(args) => {
            let (session, store) = ctx.store_for().await?;
            print!("{}", read_message(store, session, &args).await?);
            Ok(())
        }
        Command::Delete(args) => {
            if !args.yes {
                bail!("Deleting {} is permanent; pass --yes to confirm", args.message.id);
            }
            let (session, store) = ctx.store_for().await?;
            delete_message(store, session, &args).await?;
            println!("Deleted.");
            Ok(())
        }
    }
}

async fn configure(mut ctx: Context, args: ConfigArgs) -> Result<()> {
    if !args.is_empty() {
        let settings = &mut ctx.settings;
        if let Some(url) = args.store_url {
            settings.store_url = Some(url);
        }
        if let Some(collection) = args.collection {
            settings.collection = collection;
        }
        if let Some(key) = args.api_key {
            settings.api_key = Some(key);
        }
        if let Some(url) = args.identity_url {
            settings.identity_url = url;
        }
        // Validate before persisting.
        if ctx.settings.store_url.is_some() {
            ctx.settings.store_client(None)?;
        }
        settings::save_settings(&ctx.settings_path, &ctx.settings).await?;
    }

    let s = &ctx.settings;
    println!("store_url:    {}", s.store_url.as_deref().unwrap_or("(not set)"));
    println!("collection:   {}", s.collection);
    println!(
        "api_key:      {}",
        if s.api_key.is_some() { "(set)" } else { "(not set)" }
    );
    println!("identity_url: {}", s.identity_url);
    Ok(())
}

async fn signup(ctx: &Context, args: SignupArgs) -> Result<()> {
    let provider = ctx.settings.identity_client()?;
    let form = SignUpForm {
        email: args.email,
        password: args.password,
        confirm: args.confirm,
        agree: args.agree,
    };

    let user = sign_up(&provider, &form).await?;
    println!("Account created for {}. Log in to continue.", user.email);
    Ok(())
}

async fn login(ctx: &Context, args: LoginArgs) -> Result<()> {
    let provider = ctx.settings.identity_client()?;
    let form = LoginForm {
        email: args.email,
        password: args.password,
    };

    let session = log_in(&provider, &ctx.slot, &form).await?;
    println!("Logged in as {}.", session.email);
    Ok(())
}

async fn compose(ctx: &Context, args: ComposeArgs) -> Result<()> {
    let session = ctx.slot.load().await?;
    if session.as_ref().is_some_and(Session::is_expired) {
        return Err(mailbox_core::Error::SessionExpired.into());
    }
    let store = ctx.settings.store_client(session.as_ref())?;
    let draft = Draft::new(args.to, args.subject, args.message);

    let receipt = send_mail(&store, session.as_ref(), &draft).await?;
    info!("Sent {} / delivered {}", receipt.sent_id, receipt.inbox_id);
    println!("Message sent to {}.", receipt.message.to);
    Ok(())
}

async fn list_folder<S: MailStore>(store: S, session: Session, folder: Folder) -> String {
    let mut view = FolderView::new(store, session, folder);
    view.load().await;
    render::folder_listing(folder, view.records())
}

async fn read_message<S: MailStore>(
    store: S,
    session: Session,
    args: &MessageArgs,
) -> Result<String> {
    let mut view = FolderView::new(store, session, args.folder);
    view.try_load().await?;
    let record = view.open(&args.id).await?;
    Ok(render::message_view(&record))
}

async fn delete_message<S: MailStore>(store: S, session: Session, args: &DeleteArgs) -> Result<()> {
    let mut view = FolderView::new(store, session, args.message.folder);
    view.try_load().await?;
    view.delete(&args.message.id).await?;
    Ok(())
}
