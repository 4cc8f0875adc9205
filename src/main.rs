//! 程序入口：初始化日志、加载配置、分发子命令

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::SubscriberBuilder;

use fanyi_tongbu::service::maintenance;
use fanyi_tongbu::{AppConfig, CsvTranscoder, DeepLClient, MissingKeyAuditor, TreeSynchronizer};

#[derive(Parser)]
#[command(name = "fanyi_tongbu", version, about = "多语言JSON资源翻译同步工具")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "appsettings.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 以fr为基准补全所有语言的缺失译文
    Sync,
    /// 导出所有翻译为CSV表格
    Export,
    /// 从CSV表格导入译文
    Import {
        /// CSV文件路径
        csv: PathBuf,
    },
    /// 递归排序所有JSON文件的键
    Sort,
    /// 将所有JSON文件替换为扁平形式
    Flatten,
    /// 将扁平JSON文件还原为嵌套形式
    Unflatten,
    /// 报告各语言缺失的顶层键
    Audit,
}

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("配置加载失败: {}", cli.config.display()))?;

    match cli.command {
        Command::Sync => {
            let translator = DeepLClient::new(&config.deepl_api_key)?;
            let failures = TreeSynchronizer::new(&config, &translator).sync_all();
            if failures > 0 {
                anyhow::bail!("{failures} 个资源组同步失败");
            }
        }
        Command::Export => {
            CsvTranscoder::new(&config).export_all()?;
        }
        Command::Import { csv } => {
            CsvTranscoder::new(&config).import_csv(&csv)?;
        }
        Command::Sort => {
            maintenance::sort_all(&config);
        }
        Command::Flatten => {
            maintenance::flatten_all(&config);
        }
        Command::Unflatten => {
            maintenance::unflatten_all(&config);
        }
        Command::Audit => {
            MissingKeyAuditor::new(&config).audit_all()?;
        }
    }
    Ok(())
}
