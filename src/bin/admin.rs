//! Storefront Admin CLI
//!
//! Manages the accounts that can log in to the content back office.
//!
//! # Usage
//!
//! ```bash
//! storefront-admin user add editor --password s3cret
//! storefront-admin user passwd editor --password n3w
//! storefront-admin user list
//! storefront-admin user remove editor
//! STOREFRONT_ADMIN_PASSWORD=s3cret storefront-admin bootstrap
//! ```
//!
//! The database location comes from the same config as `storefront-server`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use storefront::auth::{Argon2Hasher, Authenticator};
use storefront::config::Config;
use storefront::db::{init_db, UserRepository};

const BOOTSTRAP_USERNAME: &str = "admin";

#[derive(Parser)]
#[command(name = "storefront-admin")]
#[command(version)]
#[command(about = "Storefront back office administration tool")]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    User(UserCommand),
    /// Create the `admin` account from the configured admin password,
    /// or reset its password if it exists
    Bootstrap,
}

#[derive(Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand)]
enum UserSubcommand {
    /// Add a new account
    Add {
        username: String,
        #[arg(long, short)]
        password: String,
    },
    /// Change an account's password
    Passwd {
        username: String,
        #[arg(long, short)]
        password: String,
    },
    /// List all accounts
    List,
    /// Remove an account
    Remove { username: String },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

async fn add_user(auth: &Authenticator, username: String, password: String) -> CliResult {
    let id = auth.create_user(&username, &password).await?;
    println!("Added user: {} (id {})", username, id);
    Ok(())
}

async fn change_password(auth: &Authenticator, username: String, password: String) -> CliResult {
    auth.set_password(&username, &password).await?;
    println!("Password updated for: {}", username);
    Ok(())
}

async fn list_users(users: &UserRepository) -> CliResult {
    let users = users.list().await?;

    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    println!("{:<8} {:<30} {:<30}", "ID", "USERNAME", "CREATED");
    println!("{}", "-".repeat(68));
    for user in &users {
        println!(
            "{:<8} {:<30} {:<30}",
            user.id,
            user.username,
            user.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("Total: {} user(s)", users.len());
    Ok(())
}

async fn remove_user(users: &UserRepository, username: String) -> CliResult {
    users.delete(&username).await?;
    println!("Removed user: {}", username);
    Ok(())
}

async fn bootstrap(auth: &Authenticator, users: &UserRepository, config: &Config) -> CliResult {
    let password = config
        .admin_password
        .as_deref()
        .ok_or("No admin password configured. Set admin_password or STOREFRONT_ADMIN_PASSWORD")?;

    if users.find_by_username(BOOTSTRAP_USERNAME).await?.is_some() {
        auth.set_password(BOOTSTRAP_USERNAME, password).await?;
        println!("Reset password for: {}", BOOTSTRAP_USERNAME);
    } else {
        auth.create_user(BOOTSTRAP_USERNAME, password).await?;
        println!("Added user: {}", BOOTSTRAP_USERNAME);
    }
    Ok(())
}

async fn run(cli: Cli) -> CliResult {
    let config = Config::load(cli.config)?;
    let pool = init_db(&config.database_path).await?;
    let users = UserRepository::new(pool.clone());
    let auth = Authenticator::new(users.clone(), Argon2Hasher::default());

    let result = match cli.command {
        Commands::User(user_cmd) => match user_cmd.command {
            UserSubcommand::Add { username, password } => add_user(&auth, username, password).await,
            UserSubcommand::Passwd { username, password } => {
                change_password(&auth, username, password).await
            }
            UserSubcommand::List => list_users(&users).await,
            UserSubcommand::Remove { username } => remove_user(&users, username).await,
        },
        Commands::Bootstrap => bootstrap(&auth, &users, &config).await,
    };

    pool.close().await;
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
