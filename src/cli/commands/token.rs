use anyhow::Context;
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::auth::TokenService;
use crate::cli::utils::{output_error, output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Verify a token with the configured secret and show its claims")]
    Inspect {
        #[arg(help = "Session token")]
        token: String,
    },
}

fn timestamp(secs: i64) -> String {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

pub async fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Inspect { token } => {
            let ttl = config.security.token_ttl()?;
            let service = TokenService::new(&config.security.jwt_secret, ttl).context("token service")?;

            match service.verify(token.trim()) {
                Ok(claims) => match output_format {
                    OutputFormat::Json => output_success(
                        output_format,
                        "Token is valid",
                        Some(json!({ "claims": claims })),
                    ),
                    OutputFormat::Text => {
                        println!("✓ Token is valid");
                        output_fields(&[
                            ("id", claims.id.to_string()),
                            ("email", claims.email.clone()),
                            ("role", claims.role.to_string()),
                            ("issued", timestamp(claims.iat)),
                            ("expires", timestamp(claims.exp)),
                        ]);
                        Ok(())
                    }
                },
                Err(rejection) => {
                    output_error(output_format, &format!("Token rejected: {}", rejection), Some(rejection.as_str()))?;
                    anyhow::bail!("token rejected: {}", rejection)
                }
            }
        }
    }
}
