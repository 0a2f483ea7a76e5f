use std::path::PathBuf;

use bpe_tokenizer::{BpeTokenizer, TokenId, TokenizerConfig};
use clap::{Parser, Subcommand};
use log::info;

/// Inspect a BPE vocabulary and run text through it
#[derive(Parser, Debug)]
#[command(name = "bpe-tokenizer", version, about)]
struct Cli {
    /// JSON file with encoding settings (dummy prefix, byte fallback, unk/pad ids)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print vocabulary metadata as JSON
    Info { vocab: PathBuf },
    /// Encode text and print the token ids as a JSON array
    Encode {
        vocab: PathBuf,
        text: String,
        /// Number of BOS tokens to prepend
        #[arg(long, default_value_t = 0)]
        bos: usize,
        /// Number of EOS tokens to append
        #[arg(long, default_value_t = 0)]
        eos: usize,
    },
    /// Decode token ids and print the text
    Decode {
        vocab: PathBuf,
        #[arg(required = true)]
        ids: Vec<TokenId>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!("Reading config from {}", path.display());
            TokenizerConfig::from_json_file(path)?
        }
        None => TokenizerConfig::default(),
    };
    let mut tokenizer = BpeTokenizer::with_config(config);

    match cli.command {
        Command::Info { vocab } => {
            tokenizer.load(&vocab)?;
            println!("{}", serde_json::to_string_pretty(&tokenizer.metadata())?);
        }
        Command::Encode { vocab, text, bos, eos } => {
            tokenizer.load(&vocab)?;
            let tokens = tokenizer.encode(&text, bos, eos)?;
            println!("{}", serde_json::to_string(&tokens)?);
        }
        Command::Decode { vocab, ids } => {
            tokenizer.load(&vocab)?;
            println!("{}", tokenizer.decode_all(&ids)?);
        }
    }
    Ok(())
}
