//! telegate — interactive login demo.
//!
//! Wires the service together the way a host application would: stores,
//! registry, connector, and manager are constructed once here and passed by
//! `Arc`. Walks the full phone → code → (optional) password flow against a
//! real Telegram account, then prints the profile, a page of dialogs, and
//! the folder list.
//!
//! ```text
//! TELEGATE_API_ID=... TELEGATE_API_HASH=... TELEGATE_PHONE=+1555... telegate
//! ```

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use {
    anyhow::Context,
    clap::Parser,
    tracing_subscriber::EnvFilter,
};

use {
    telegate_accounts::{AccountStore, MemoryAccountStore, MemoryUserStore, NewAccount, UserStore},
    telegate_mtproto::{ApiCredentials, Connector, DialogsQuery, LayerConnector},
    telegate_sessions::{CodeOutcome, ConnectOutcome, SessionManager, SessionRegistry},
};

/// The single demo user owning the account record.
const DEMO_USER: i64 = 1;

#[derive(Parser)]
#[command(name = "telegate", about = "Interactive Telegram account login demo")]
struct Cli {
    /// Telegram API id (from https://my.telegram.org).
    #[arg(long, env = "TELEGATE_API_ID")]
    api_id: i32,

    /// Telegram API hash.
    #[arg(long, env = "TELEGATE_API_HASH")]
    api_hash: String,

    /// Phone number in international format.
    #[arg(long, env = "TELEGATE_PHONE")]
    phone: String,

    /// Directory for MTProto session working files.
    #[arg(long, env = "TELEGATE_SESSION_DIR", default_value = ".telegate-sessions")]
    session_dir: PathBuf,

    /// How many dialogs to list after login.
    #[arg(long, default_value_t = 10)]
    dialogs: usize,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let registry = Arc::new(SessionRegistry::new());
    let connector = Arc::new(LayerConnector::new(&cli.session_dir));
    let accounts = Arc::new(MemoryAccountStore::new());
    let users = Arc::new(MemoryUserStore::new());
    users.insert(DEMO_USER, true).await;

    let account = accounts
        .create(NewAccount {
            user_id: DEMO_USER,
            phone: cli.phone.clone(),
            credentials: ApiCredentials::new(cli.api_id, cli.api_hash.clone()),
            name: None,
        })
        .await
        .context("creating demo account record")?;

    let manager = SessionManager::new(
        registry,
        connector as Arc<dyn Connector>,
        accounts as Arc<dyn AccountStore>,
        users as Arc<dyn UserStore>,
    );

    match manager.connect(DEMO_USER, account.id).await? {
        ConnectOutcome::Online => println!("Session resumed — already authorized."),
        ConnectOutcome::CodeRequired => {
            let code = prompt("Enter the code you received: ")?;
            match manager.verify_code(DEMO_USER, account.id, &code).await? {
                CodeOutcome::Connected => println!("Signed in."),
                CodeOutcome::PasswordRequired { password_hint } => {
                    if let Some(hint) = &password_hint {
                        println!("Two-factor password required (hint: {hint})");
                    } else {
                        println!("Two-factor password required");
                    }
                    let password = prompt("Enter your password: ")?;
                    manager
                        .verify_password(DEMO_USER, account.id, &password)
                        .await?;
                    println!("Signed in.");
                }
            }
        }
    }

    let profile = manager.profile(DEMO_USER, account.id).await?;
    println!(
        "\nLogged in as {} (id {}, phone {})",
        profile.first_name.as_deref().unwrap_or("<unnamed>"),
        profile.id,
        profile.phone,
    );

    let page = manager
        .dialogs(
            DEMO_USER,
            account.id,
            DialogsQuery {
                limit: cli.dialogs,
                offset: 0,
                archived: false,
            },
        )
        .await?;
    println!("\nDialogs ({} shown, more: {}):", page.dialogs.len(), page.has_more);
    for dialog in &page.dialogs {
        println!(
            "  [{:>12}] {:<32} unread {}",
            dialog.id, dialog.name, dialog.unread_count
        );
    }

    println!("\nFolders:");
    for folder in manager.folders(DEMO_USER, account.id).await? {
        println!("  [{:>2}] {}", folder.id, folder.title);
    }

    manager.shutdown().await;
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
