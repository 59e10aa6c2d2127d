use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use warden_cli::{keys, token};

#[derive(Parser)]
#[command(name = "warden-cli")]
#[command(about = "Warden CLI - key and token tooling for the Warden API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA private key into the key folder
    Genkey {
        /// Key folder to write `<kid>.pem` into
        #[arg(short = 'o', long, env = "AUTH_KEYS_FOLDER", default_value = "zarf/keys")]
        output: PathBuf,

        /// Key id (defaults to a random UUID)
        #[arg(short = 'k', long)]
        kid: Option<String>,

        /// Modulus size in bits
        #[arg(short = 'b', long, default_value = "2048")]
        bits: usize,
    },
    /// Sign a token with a key from the key folder and check it
    Gentoken {
        /// Key folder to load
        #[arg(long, env = "AUTH_KEYS_FOLDER", default_value = "zarf/keys")]
        keys: PathBuf,

        /// Key id to sign with
        #[arg(short = 'k', long, env = "AUTH_ACTIVE_KID")]
        kid: String,

        /// Token subject
        #[arg(short = 's', long)]
        subject: String,

        /// Token issuer
        #[arg(short = 'i', long, env = "AUTH_ISSUER", default_value = "service project")]
        issuer: String,

        /// Comma separated roles
        #[arg(short = 'r', long, default_value = "")]
        roles: String,

        /// Lifetime in hours
        #[arg(long, default_value = "8760")]
        ttl_hours: i64,
    },
}

fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Genkey { output, kid, bits } => {
            let key = keys::generate_key(&output, kid, bits)?;
            println!("Wrote private key {} (kid {})\n", key.path.display(), key.kid);
            print!("{}", key.public_pem);
        }
        Commands::Gentoken {
            keys,
            kid,
            subject,
            issuer,
            roles,
            ttl_hours,
        } => {
            let framed = token::generate_token(&token::TokenRequest {
                keys,
                kid,
                subject,
                issuer,
                roles: token::parse_roles(&roles),
                ttl_hours,
            })?;
            print!("{framed}");
            println!("\nTOKEN VALIDATED!");
        }
    }

    Ok(())
}
