pub mod config;
pub mod fst;
pub mod grammar;
pub mod tagger;

use anyhow::Result;
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

use config::GrammarConfig;
use tagger::NumeralTagger;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "text-normalizer", about = "标注文本中的小数与基数")]
struct CliArgs {
    /// 语法配置文件（默认读取用户配置目录）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 输出标注后的文本而不是 JSON
    #[arg(long)]
    text: bool,

    /// 待标注的文本；为空时逐行读取 stdin
    #[arg(allow_hyphen_values = true)]
    inputs: Vec<String>,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();
    let config = match &args.config {
        Some(path) => GrammarConfig::load_from(path)?,
        None => GrammarConfig::load()?,
    };
    let tagger = NumeralTagger::new(&config)?;

    let emit = |line: &str| -> Result<()> {
        let result = tagger.tag(line);
        if args.text {
            println!("{}", result.tagged_text());
        } else {
            println!("{}", serde_json::to_string(&result)?);
        }
        Ok(())
    };

    if args.inputs.is_empty() {
        for line in std::io::stdin().lock().lines() {
            emit(&line?)?;
        }
    } else {
        for input in &args.inputs {
            emit(input)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args() {
        let args = CliArgs::try_parse_from([
            "text-normalizer",
            "--config",
            "grammar.json",
            "--text",
            "1.2345",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("grammar.json")));
        assert!(args.text);
        assert_eq!(args.inputs, vec!["1.2345"]);

        let args = CliArgs::try_parse_from(["text-normalizer"]).unwrap();
        assert_eq!(args.config, None);
        assert!(!args.text);
        assert!(args.inputs.is_empty());
    }

    #[test]
    fn test_cli_args_errors() {
        assert!(CliArgs::try_parse_from(["text-normalizer", "--config"]).is_err());
        assert!(CliArgs::try_parse_from(["text-normalizer", "--unknown"]).is_err());
    }

    #[test]
    fn test_cli_args_negative_input() {
        let args = CliArgs::try_parse_from(["text-normalizer", "--text", "-12.5006 billion"]).unwrap();
        assert!(args.text);
        assert_eq!(args.inputs, vec!["-12.5006 billion"]);
    }
}
