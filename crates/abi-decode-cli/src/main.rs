// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `abi-decode`: decode ABI call data against a function signature.
//!
//! ```text
//! abi-decode decode  --signature 'f(uint256 a,uint16[] b)' --data 0x...
//! abi-decode inspect --signature 'f(uint256 a,uint16[] b)'
//! abi-decode config set --mode legacy
//! ```
//!
//! Output is JSON on stdout; logs go to stderr (`RUST_LOG` controls the filter).

mod config;
mod input;
mod render;

use std::io::Write;
use std::path::{Path, PathBuf};

use abi_decode::{encode, DecoderMode, FunctionSignature, TrailingBytes};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{CliPrefs, ConfigService, FsConfigStore, PREFS_KEY};

const SELECTOR_LEN: usize = 4;

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode ABI call data against a function signature")]
struct Args {
    /// Directory holding `prefs.json` (defaults to the platform config dir)
    #[arg(long, global = true, env = "ABI_DECODE_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode call data and print the parameters as JSON
    Decode(DecodeArgs),
    /// Print the parsed type tree of a signature as JSON
    Inspect {
        /// Function signature or parameter tuple, e.g. `f(uint256,uint16[])`
        #[arg(long, short)]
        signature: String,
    },
    /// Show or change the stored default policy
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct DecodeArgs {
    /// Function signature or parameter tuple, e.g. `f(uint256,uint16[])`
    #[arg(long, short)]
    signature: String,
    /// Hex call data (an `0x` prefix and whitespace are accepted)
    #[arg(long, conflicts_with = "data_file")]
    data: Option<String>,
    /// File holding the call data; stdin is read when neither source is given
    #[arg(long)]
    data_file: Option<PathBuf>,
    /// The file or stdin holds raw bytes instead of hex text
    #[arg(long, conflicts_with = "data")]
    binary: bool,
    /// Drop a leading 4-byte function selector before decoding
    #[arg(long)]
    skip_selector: bool,
    /// Validation regime (overrides the stored default)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Trailing-bytes handling (overrides the stored default)
    #[arg(long, value_enum)]
    trailing_bytes: Option<TrailingArg>,
    /// Print the tagged value tree instead of named parameters
    #[arg(long)]
    raw: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the stored preferences and the policy they resolve to
    Show,
    /// Update the stored preferences
    Set {
        /// Default validation regime
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Default trailing-bytes handling
        #[arg(long, value_enum)]
        trailing_bytes: Option<TrailingArg>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Strict,
    Legacy,
}

impl From<ModeArg> for DecoderMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Strict => Self::Strict,
            ModeArg::Legacy => Self::Legacy,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TrailingArg {
    Allow,
    Reject,
}

impl From<TrailingArg> for TrailingBytes {
    fn from(arg: TrailingArg) -> Self {
        match arg {
            TrailingArg::Allow => Self::Allow,
            TrailingArg::Reject => Self::Reject,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let service = ConfigService::new(open_store(args.config_dir.as_deref())?);
    let output = match args.cmd {
        Command::Decode(decode) => run_decode(&service, decode)?,
        Command::Inspect { signature } => run_inspect(&signature)?,
        Command::Config { action } => run_config(&service, action)?,
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

fn open_store(dir: Option<&Path>) -> Result<FsConfigStore> {
    match dir {
        Some(dir) => Ok(FsConfigStore::at(dir)),
        None => FsConfigStore::new().context("resolving the config directory"),
    }
}

fn parse_signature(text: &str) -> Result<FunctionSignature> {
    FunctionSignature::parse(text).with_context(|| format!("parsing signature `{text}`"))
}

fn run_decode(
    service: &ConfigService<FsConfigStore>,
    args: DecodeArgs,
) -> Result<serde_json::Value> {
    let signature = parse_signature(&args.signature)?;
    let prefs = service.prefs().context("loading preferences")?;
    let policy = prefs.policy(args.mode.map(Into::into), args.trailing_bytes.map(Into::into));

    let mut data = input::load(args.data.as_deref(), args.data_file.as_deref(), args.binary)?;
    if args.skip_selector {
        if data.len() < SELECTOR_LEN {
            bail!("call data is shorter than a function selector ({} bytes)", data.len());
        }
        data.drain(..SELECTOR_LEN);
    }
    info!(signature = %signature, len = data.len(), ?policy, "decoding");

    let value = signature
        .decode_params(&data, policy)
        .with_context(|| format!("decoding {} bytes as {signature}", data.len()))?;
    let canonical = encode(&value) == data;

    let params = if args.raw {
        serde_json::to_value(&value)?
    } else {
        render::params(&signature, &value)
    };
    Ok(json!({
        "signature": signature.to_string(),
        "policy": policy,
        "canonical": canonical,
        "params": params,
    }))
}

fn run_inspect(text: &str) -> Result<serde_json::Value> {
    let signature = parse_signature(text)?;
    Ok(json!({
        "name": signature.name(),
        "signature": signature.to_string(),
        "params": render::describe(signature.params()),
    }))
}

fn run_config(
    service: &ConfigService<FsConfigStore>,
    action: ConfigAction,
) -> Result<serde_json::Value> {
    let mut prefs = service.prefs().context("loading preferences")?;
    if let ConfigAction::Set {
        mode,
        trailing_bytes,
    } = action
    {
        if mode.is_none() && trailing_bytes.is_none() {
            bail!("nothing to set: pass --mode and/or --trailing-bytes");
        }
        if let Some(mode) = mode {
            prefs.mode = mode.into();
        }
        if let Some(trailing) = trailing_bytes {
            prefs.trailing_bytes = Some(trailing.into());
        }
        service.save(PREFS_KEY, &prefs).context("saving preferences")?;
        info!(?prefs, "preferences saved");
    }
    Ok(describe_prefs(prefs))
}

fn describe_prefs(prefs: CliPrefs) -> serde_json::Value {
    json!({
        "prefs": prefs,
        "policy": prefs.policy(None, None),
    })
}
