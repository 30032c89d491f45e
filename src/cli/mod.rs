use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::config::{self, AppConfig};
use crate::database::models::NewUser;
use crate::database::repository::users;
use crate::database::DatabaseManager;
use crate::types::GlobalRole;
use crate::{create_router, AppState};

#[derive(Parser)]
#[command(name = "skylab-api")]
#[command(about = "Skylab API - lab management backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create an admin account if the email is free")]
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Admin")]
        name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },

    #[command(about = "Print the Argon2 hash of a password")]
    HashPassword { password: String },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config().clone();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect_lazy(&config.database)?;
            DatabaseManager::migrate(&pool).await?;
            println!("Migrations applied");
            Ok(())
        }
        Commands::CreateAdmin {
            email,
            password,
            name,
            last_name,
        } => {
            let pool = DatabaseManager::connect_lazy(&config.database)?;
            if ensure_admin(&pool, &email, &password, &name, &last_name).await? {
                println!("Created admin {}", email);
            } else {
                println!("An active user with email {} already exists", email);
            }
            Ok(())
        }
        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.api.port = port;
    }
    if config.security.jwt_secret.is_empty() {
        bail!("SECURITY_JWT_SECRET must be set in {:?} mode", config.environment);
    }

    info!("Starting Skylab API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect_lazy(&config.database)?;

    // The server still starts without a database; requests then fail with 503
    if config.database.run_migrations {
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            warn!("Skipping migrations: {}", e);
        }
    }

    if let (Some(email), Some(password)) = (&config.bootstrap.admin_email, &config.bootstrap.admin_password) {
        match ensure_admin(&pool, email, password, "Admin", "").await {
            Ok(true) => info!("Bootstrapped admin {}", email),
            Ok(false) => info!("Bootstrap admin {} already present", email),
            Err(e) => warn!("Could not bootstrap admin: {:#}", e),
        }
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Skylab API listening on http://{}", bind_addr);

    axum::serve(listener, create_router(AppState::new(pool, config))).await?;
    Ok(())
}

async fn ensure_admin(pool: &PgPool, email: &str, password: &str, name: &str, last_name: &str) -> anyhow::Result<bool> {
    let admin = NewUser {
        name: name.to_string(),
        last_name: last_name.to_string(),
        email: email.trim().to_lowercase(),
        password_hash: hash_password(password)?,
        telephone_number: String::new(),
        university: String::new(),
        department: String::new(),
        date_of_birth: Utc::now(),
        role: GlobalRole::Admin,
    };

    Ok(users::ensure_admin(pool, &admin).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["skylab-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn create_admin_requires_email_and_password() {
        assert!(Cli::try_parse_from(["skylab-api", "create-admin", "--email", "a@lab.test"]).is_err());

        let cli = Cli::try_parse_from([
            "skylab-api",
            "create-admin",
            "--email",
            "a@lab.test",
            "--password",
            "secret123",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateAdmin { name, .. }) => assert_eq!(name, "Admin"),
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn serve_accepts_port_override() {
        let cli = Cli::try_parse_from(["skylab-api", "serve", "--port", "8081"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8081) })));
    }
}
