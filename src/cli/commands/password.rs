use clap::Subcommand;
use serde_json::json;

use crate::auth::PasswordHasher;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Print a bcrypt hash of the given plaintext at the configured cost")]
    Hash {
        #[arg(help = "Plaintext password")]
        plaintext: String,
    },
}

pub async fn handle(cmd: PasswordCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PasswordCommands::Hash { plaintext } => {
            let hasher = PasswordHasher::new(config.security.bcrypt_cost);
            let hash = hasher.hash(&plaintext).await?;

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Password hashed",
                    Some(json!({ "hash": hash, "cost": hasher.cost() })),
                ),
                OutputFormat::Text => {
                    println!("{}", hash);
                    Ok(())
                }
            }
        }
    }
}
