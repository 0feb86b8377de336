//! kifu-convert: KIF / CSA / USI の棋譜を USI の指し手列などに変換する
//!
//! ```text
//! kifu-convert game.kif
//! kifu-convert --format csa --output json < games.csa
//! ```

mod config;
mod output;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kifu_notation::{FormatHint, GameOutcome, ingest};

use config::ConvertConfig;
use output::{OutputFormat, write_games};

/// 入力形式（`auto` は内容から判定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Auto,
    Kif,
    Csa,
    Usi,
}

impl From<InputFormat> for FormatHint {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Auto => FormatHint::Auto,
            InputFormat::Kif => FormatHint::Kif,
            InputFormat::Csa => FormatHint::Csa,
            InputFormat::Usi => FormatHint::Usi,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert KIF / CSA / USI kifu to USI moves")]
struct Cli {
    /// 入力ファイル（省略時は標準入力）
    inputs: Vec<PathBuf>,

    /// 入力形式
    #[arg(short, long, value_enum)]
    format: Option<InputFormat>,

    /// 出力形式
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// 設定ファイル（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 二歩を反則とし、変換に失敗した局や読めない行があれば異常終了する
    #[arg(long)]
    strict: bool,

    /// ログを詳しくする（-v: info, -vv: debug, -vvv: trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<(String, String)>> {
    if inputs.is_empty() {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(vec![("<stdin>".to_string(), text)]);
    }
    inputs
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((path.display().to_string(), text))
        })
        .collect()
}

/// strict のとき、失敗した局・警告のある局を数える
fn count_problems(name: &str, games: &[GameOutcome]) -> usize {
    let mut problems = 0;
    for game in games {
        for warning in &game.warnings {
            log::error!("{name}: game {}: {warning}", game.index);
            problems += 1;
        }
        if let Err(e) = &game.record {
            log::error!("{name}: game {}: {e}", game.index);
            problems += 1;
        }
    }
    problems
}

fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };
    let hint = cli.format.map(FormatHint::from).or(config.format).unwrap_or_default();
    let format = cli.output.or(config.output).unwrap_or_default();
    let strict = cli.strict || config.strict.unwrap_or(false);
    let mut options = config.transpile;
    if strict {
        options.reject_double_pawn = true;
    }
    log::debug!("input {hint:?}, output {format:?}, strict {strict}, {options:?}");

    let mut ok = true;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (name, text) in read_inputs(&cli.inputs)? {
        let games = ingest(&text, hint, options).with_context(|| format!("{name}: cannot convert"))?;
        log::info!("{name}: {} game(s)", games.len());
        if strict && count_problems(&name, &games) > 0 {
            ok = false;
            continue;
        }
        write_games(&mut out, format, &games)?;
    }
    out.flush()?;
    Ok(ok)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
