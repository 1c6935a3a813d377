use aes_antiforgery::{
    config::{
        keys::{IV_ENV_VAR, KEY_ENV_VAR},
        AntiforgeryConfig, EnvironmentKeyProvider, KeyMaterial, KeyMaterialProvider,
    },
    services::{AesCipher, SymmetricCipher},
    AntiforgeryService, RequestToken,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aes-antiforgery-cli")]
#[command(about = "Key and token tooling for AES antiforgery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key material commands
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Token commands (keys are read from the environment)
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Print a fresh key and IV as shell exports
    Generate,
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Decrypt a cookie value and show the token inside it
    Inspect {
        /// Value of the csrf_requestid_cookie cookie
        cookie: String,
    },

    /// Mint a token set and print both halves
    Mint,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keys { command } => match command {
            KeyCommands::Generate => {
                let keys = KeyMaterial::generate();
                println!("export {}={}", KEY_ENV_VAR, keys.key_base64());
                println!("export {}={}", IV_ENV_VAR, keys.iv_base64());
            }
        },
        Commands::Token { command } => {
            let keys = EnvironmentKeyProvider::default()
                .key_material()
                .context("Failed to load key material")?;

            match command {
                TokenCommands::Inspect { cookie } => {
                    let plaintext = AesCipher::new(keys)
                        .decrypt(cookie.trim())
                        .context("Cookie could not be decrypted with these keys")?;
                    let token = RequestToken::parse(&plaintext)
                        .context("Cookie does not contain a valid token")?;
                    let now = chrono::Utc::now();

                    println!("Token id: {}", token.id);
                    println!("Expires:  {}", token.expiry.to_rfc3339());
                    println!("Expired:  {}", token.has_expired(now));
                }
                TokenCommands::Mint => {
                    let config = AntiforgeryConfig::from_env()?;
                    let tokens = AntiforgeryService::new(keys, config).mint_token_set()?;

                    println!("{}={}", tokens.cookie_name, tokens.cookie_token);
                    println!("{}={}", tokens.form_field_name, tokens.request_token);
                    println!("{}: {}", tokens.header_name, tokens.request_token);
                }
            }
        }
    }

    Ok(())
}
