use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lingo_gateway::api::ApiServer;
use lingo_gateway::db::{self, NewUser, UserRepo};
use lingo_gateway::Config;

/// Lingo - Voice-enabled language-tutoring chat gateway
#[derive(Parser)]
#[command(name = "lingo", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "LINGO_PORT", default_value = "8710")]
    port: u16,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// One-off bootstrap of the admin account
    InitAdmin {
        /// Admin username
        #[arg(short, long, default_value = "admin")]
        username: String,
    },
    /// Create a user account
    CreateUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Full name
        #[arg(short, long)]
        full_name: Option<String>,
        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
    /// List user accounts
    ListUsers,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lingo_gateway=info",
        1 => "info,lingo_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load();
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::InitAdmin { username } => init_admin(&config, &username),
            Command::CreateUser {
                username,
                email,
                full_name,
                admin,
            } => create_user(&config, &username, email, full_name, admin),
            Command::ListUsers => list_users(&config),
        };
    }

    tracing::info!(port = cli.port, "starting lingo gateway");

    let server = ApiServer::new(&config, cli.port)?;
    server.run().await?;

    Ok(())
}

fn open_user_repo(config: &Config) -> anyhow::Result<UserRepo> {
    std::fs::create_dir_all(&config.data_dir)?;
    let pool = db::init(config.data_dir.join("lingo.db"))?;
    Ok(UserRepo::new(pool))
}

/// Bootstrap the admin account, prompting for its password
fn init_admin(config: &Config, username: &str) -> anyhow::Result<()> {
    let repo = open_user_repo(config)?;

    if repo.find_by_username(username)?.is_some() {
        println!("Admin user '{username}' already exists");
        return Ok(());
    }

    let password = dialoguer::Password::new()
        .with_prompt(format!("Password for '{username}'"))
        .with_confirmation("Confirm password", "Passwords don't match")
        .interact()?;

    let user = repo.create(&NewUser {
        username: username.to_string(),
        password,
        email: None,
        full_name: Some("Administrator".to_string()),
        is_admin: true,
    })?;

    println!("Admin user created (id {})", user.id);
    Ok(())
}

/// Create a user account, prompting for its password
fn create_user(
    config: &Config,
    username: &str,
    email: Option<String>,
    full_name: Option<String>,
    admin: bool,
) -> anyhow::Result<()> {
    let repo = open_user_repo(config)?;

    let password = dialoguer::Password::new()
        .with_prompt(format!("Password for '{username}'"))
        .with_confirmation("Confirm password", "Passwords don't match")
        .interact()?;

    let user = repo.create(&NewUser {
        username: username.to_string(),
        password,
        email,
        full_name,
        is_admin: admin,
    })?;

    println!("User '{}' created (id {})", user.username, user.id);
    Ok(())
}

/// List user accounts
fn list_users(config: &Config) -> anyhow::Result<()> {
    let repo = open_user_repo(config)?;

    let users = repo.list_all()?;
    if users.is_empty() {
        println!("No users");
        return Ok(());
    }

    for user in users {
        let flags = match (user.is_admin, user.is_active) {
            (true, true) => " [admin]",
            (true, false) => " [admin, inactive]",
            (false, false) => " [inactive]",
            (false, true) => "",
        };
        let last_login = user
            .last_login
            .map_or_else(|| "never".to_string(), |dt| dt.to_rfc3339());
        println!(
            "{:4}  {:20}  last login: {}{}",
            user.id, user.username, last_login, flags
        );
    }

    Ok(())
}
