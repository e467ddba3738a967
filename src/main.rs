// ==========================================
// Controle PCP - 命令行入口
// ==========================================
// 用法:
//   pcp-control <文件> [--today YYYY-MM-DD] [--window weekly|monthly|yearly]
//               [--filter 维度=值1,值2]... [--db 配置库路径] [--log-json]
// 输出: 看板报表（JSON，stdout）；日志写 stderr
// ==========================================

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};

use pcp_control::app::{get_default_db_path, AppState};
use pcp_control::domain::types::WindowKind;
use pcp_control::engine::filter::Selections;
use pcp_control::logging;

#[derive(Debug, Default)]
struct CliArgs {
    file: Option<String>,
    today: Option<NaiveDate>,
    window: Option<WindowKind>,
    filters: HashMap<String, Vec<String>>,
    db_path: Option<String>,
    log_json: bool,
}

fn usage() -> String {
    format!(
        "{} {}\n\n用法: pcp-control <文件> [--today YYYY-MM-DD] [--window weekly|monthly|yearly] \
         [--filter 维度=值1,值2]... [--db 配置库路径] [--log-json]\n\
         维度: lot_type, plan_id, status, situation, sector_code",
        pcp_control::APP_NAME,
        pcp_control::VERSION
    )
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs> {
    let mut cli = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--today" => {
                let value = args.next().ok_or_else(|| anyhow!("--today 缺少取值"))?;
                let today = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .with_context(|| format!("--today 日期无效: {}", value))?;
                cli.today = Some(today);
            }
            "--window" => {
                let value = args.next().ok_or_else(|| anyhow!("--window 缺少取值"))?;
                let window = WindowKind::parse(&value)
                    .ok_or_else(|| anyhow!("--window 取值无效: {}", value))?;
                cli.window = Some(window);
            }
            "--filter" => {
                let value = args.next().ok_or_else(|| anyhow!("--filter 缺少取值"))?;
                let (dimension, values) = value
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--filter 需要 维度=值 形式: {}", value))?;
                cli.filters
                    .entry(dimension.trim().to_string())
                    .or_default()
                    .extend(values.split(',').map(|v| v.trim().to_string()));
            }
            "--db" => {
                cli.db_path = Some(args.next().ok_or_else(|| anyhow!("--db 缺少取值"))?);
            }
            "--log-json" => cli.log_json = true,
            "-h" | "--help" => bail!(usage()),
            other if other.starts_with("--") => bail!("未知参数: {}\n\n{}", other, usage()),
            _ => {
                if cli.file.is_some() {
                    bail!("只能指定一个输入文件\n\n{}", usage());
                }
                cli.file = Some(arg);
            }
        }
    }

    Ok(cli)
}

fn run(cli: CliArgs) -> Result<()> {
    let file = cli.file.ok_or_else(|| anyhow!(usage()))?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    let db_path = cli.db_path.unwrap_or_else(get_default_db_path);
    tracing::info!("使用配置库: {}", db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    let selections = Selections::from_named(&cli.filters)?;

    let load = state.dashboard_api.load_file(&file, today)?;
    tracing::info!(
        batch_id = %load.batch_id,
        kept = load.summary.kept_rows,
        dropped = load.summary.dropped_rows,
        diagnostics = load.diagnostics.len(),
        "文件已加载"
    );
    for diagnostic in &load.diagnostics {
        tracing::debug!(
            kind = ?diagnostic.kind,
            row = ?diagnostic.row_number,
            column = ?diagnostic.column,
            "{}",
            diagnostic.message
        );
    }

    let outcome = state.dashboard_api.report(&selections, cli.window)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = parse_args(std::env::args().skip(1))?;

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} {}", pcp_control::APP_NAME, pcp_control::VERSION);
    run(cli)
}
