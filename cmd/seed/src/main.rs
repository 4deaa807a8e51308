//! Creates a user with an explicit role. Registration over HTTP always
//! yields `Read`, so writers and administrators are provisioned here.
//!
//! ```text
//! seed --username admin --role Administer   # password from SEED_PASSWORD
//! ```

use anyhow::{bail, Context};
use auth_adapters::Argon2Hasher;
use clap::Parser;
use configs::Settings;
use domains::{PasswordHasher, Role, User, UserRepository};
use secrecy::ExposeSecret;
use storage_adapters::postgres;
use storage_adapters::PostgresUserRepo;

#[derive(Debug, Parser)]
#[command(about = "Provision a blog user with a given role")]
struct Args {
    #[arg(long)]
    username: String,

    #[arg(long, env = "SEED_PASSWORD", hide_env_values = true)]
    password: String,

    /// Read, Write or Administer
    #[arg(long, default_value = "Read", value_parser = parse_role)]
    role: Role,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse().map_err(|e: domains::DomainError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();

    let args = Args::parse();
    if args.username.is_empty() || args.password.is_empty() {
        bail!("username and password must not be empty");
    }

    let settings = Settings::load().context("failed to load configuration")?;

    let pool = postgres::connect(settings.database.url.expose_secret(), 1)
        .await
        .context("failed to connect to database")?;
    postgres::migrate(&pool)
        .await
        .context("failed to run database migrations")?;

    let hasher = Argon2Hasher::new(
        settings.auth.argon2_memory_cost_kib,
        settings.auth.argon2_time_cost,
        settings.auth.argon2_parallelism,
    )?;
    let hash = hasher.hash(&args.password).await?;

    let repo = PostgresUserRepo::new(pool);
    let user = repo
        .insert(User::new(args.username, hash).with_role(args.role))
        .await
        .context("failed to create user")?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "user created");
    Ok(())
}
