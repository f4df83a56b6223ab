use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::cli::utils::{output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{PublicUser, Role};
use crate::database::DatabaseManager;
use crate::services::{NewUser, UserService};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an active admin account (fails if the email is taken)")]
    CreateAdmin {
        #[arg(long, help = "Login email")]
        email: String,

        #[arg(long, help = "Display name")]
        full_name: String,

        #[arg(long, help = "Initial password")]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::CreateAdmin {
            email,
            full_name,
            password,
        } => {
            if config.database.url.is_none() {
                anyhow::bail!("DATABASE_URL is required to create accounts");
            }
            let manager = DatabaseManager::connect(&config.database).await?;
            manager.bootstrap().await?;

            let ttl = config.security.token_ttl()?;
            let tokens = Arc::new(TokenService::new(&config.security.jwt_secret, ttl)?);
            let service = UserService::new(
                manager.store().users,
                PasswordHasher::new(config.security.bcrypt_cost),
                tokens,
            );

            let created = service
                .create(NewUser {
                    full_name: Some(full_name),
                    email: Some(email),
                    password: Some(password),
                    role: Some(Role::Admin.as_str().to_string()),
                    ..NewUser::default()
                })
                .await
                .context("failed to create admin")?;
            manager.close().await;

            let user = PublicUser::from(created);
            match output_format {
                OutputFormat::Json => {
                    output_success(output_format, "Admin created", Some(json!({ "user": user })))
                }
                OutputFormat::Text => {
                    println!("✓ Admin created");
                    output_fields(&[
                        ("id", user.id.to_string()),
                        ("email", user.email.clone()),
                        ("full_name", user.full_name.clone()),
                    ]);
                    Ok(())
                }
            }
        }
    }
}
