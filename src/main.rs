// ==========================================
// 供应商 OTIF 监控 - 命令行入口
// ==========================================
// 子命令: suppliers load|list / metrics / evolution / report / claims / config show|set
// ==========================================

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use otif_monitor::app::{get_default_db_path, AppState, DB_PATH_ENV};
use otif_monitor::domain::{ClaimFilter, ClassifiedLine};
use otif_monitor::engine::PeriodPreset;
use otif_monitor::i18n::{self, t, t_with_args};
use otif_monitor::report::{default_claims_file_name, default_metrics_file_name};
use otif_monitor::{logging, APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "otif-monitor", version)]
#[command(about = "Supplier OTIF compliance classifier, dashboard and claims")]
struct Cli {
    /// SQLite 数据库路径
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<String>,
    /// 界面语言 (en / es)，覆盖已保存的配置
    #[arg(long, global = true)]
    locale: Option<String>,
    /// 参考日期（默认今天），用于时间段与逾期天数
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 供应商花名册
    Suppliers {
        #[command(subcommand)]
        command: SupplierCommand,
    },
    /// 按供应商的 OTIF 指标
    Metrics {
        #[command(flatten)]
        orders: OrdersArgs,
        /// 导出 CSV（目录或文件路径）
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// 月度演进
    Evolution {
        #[command(flatten)]
        orders: OrdersArgs,
        /// 按前 N 个供应商拆分
        #[arg(long, default_value_t = false)]
        by_supplier: bool,
    },
    /// 生成单个供应商的报告
    Report {
        #[command(flatten)]
        orders: OrdersArgs,
        #[arg(long)]
        supplier: String,
        /// HTML 输出目录
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// 逾期未交清单与索赔函
    Claims {
        #[arg(long = "orders", required = true, num_args = 1..)]
        orders: Vec<PathBuf>,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long = "warehouse")]
        warehouses: Vec<String>,
        #[arg(long, default_value_t = 0)]
        min_days: i64,
        /// 仅索赔指定单据
        #[arg(long = "document")]
        documents: Vec<String>,
        /// 生成索赔函与 mailto 链接
        #[arg(long, default_value_t = false)]
        letters: bool,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// 配置
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum SupplierCommand {
    /// 整表替换花名册
    Load { file: PathBuf },
    List,
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    Set { key: String, value: String },
}

#[derive(Args)]
struct OrdersArgs {
    /// 订单明细文件（.xlsx / .xls / .csv）
    #[arg(long = "orders", required = true, num_args = 1..)]
    orders: Vec<PathBuf>,
    /// current-month / last-month / last-3-months / last-6-months / current-year / all
    #[arg(long, default_value = "all")]
    period: PeriodPreset,
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

impl OrdersArgs {
    fn preset(&self) -> PeriodPreset {
        match (self.from, self.to) {
            (Some(from), Some(to)) => PeriodPreset::Custom { from, to },
            _ => self.period,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_with_default(if cli.verbose { "debug" } else { "info" });

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{} 使用数据库: {}", APP_NAME, VERSION, db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    if let Some(locale) = &cli.locale {
        i18n::set_locale(locale);
    }

    let now: NaiveDateTime = match cli.today {
        Some(day) => day.and_hms_opt(0, 0, 0).context("无效日期")?,
        None => Local::now().naive_local(),
    };
    let today = now.date();

    match cli.command {
        Commands::Suppliers { command } => match command {
            SupplierCommand::Load { file } => {
                let result = state.supplier_api.load_roster(&file)?;
                if cli.json {
                    print_json(&result)?;
                } else {
                    println!(
                        "{} suppliers loaded (revision {}, {} with email)",
                        result.supplier_count, result.revision, result.with_email
                    );
                }
            }
            SupplierCommand::List => {
                let suppliers = state.supplier_api.list_suppliers()?;
                if cli.json {
                    print_json(&suppliers)?;
                } else {
                    for s in &suppliers {
                        println!(
                            "{:>8}  {:<40} {}",
                            s.code,
                            s.display_name(),
                            s.email.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        },

        Commands::Metrics { orders, export } => {
            let classified = load_classified(&state, &orders.orders).await?;
            let view = state.dashboard_api.dashboard(&classified, orders.preset(), today)?;

            if let Some(target) = export {
                let path = if target.is_dir() {
                    target.join(default_metrics_file_name(today))
                } else {
                    target
                };
                let rows = state
                    .report_api
                    .export_supplier_metrics(&classified, view.range, &path)?;
                tracing::info!(rows, path = %path.display(), "CSV 导出完成");
            }

            if cli.json {
                print_json(&view)?;
            } else {
                println!("{}: {}", t("report.period"), view.range);
                println!(
                    "{}: {}   {}: {:.2}%   suppliers: {}",
                    t("report.total_orders"),
                    view.summary.total_lines,
                    t("report.otif_pct"),
                    view.summary.otif_pct,
                    view.summary.supplier_count
                );
                if let Some(c) = &view.comparison {
                    println!(
                        "vs previous month: {:.2}% ({} lines) delta {:+.2} {}",
                        c.previous_otif_pct, c.previous_lines, c.delta, c.trend
                    );
                }
                println!();
                println!(
                    "{:<36} {:>7} {:>7} {:>8} {:>8} {:>8}",
                    "supplier", "otif", "lines", "%otif", "%fill", "avg_diff"
                );
                for m in &view.supplier_metrics {
                    println!(
                        "{:<36} {:>7} {:>7} {:>8.2} {:>8.2} {:>8.2}",
                        m.supplier_name, m.otif_count, m.total_lines, m.otif_pct, m.fill_rate_pct, m.avg_day_diff
                    );
                }
            }
        }

        Commands::Evolution { orders, by_supplier } => {
            let classified = load_classified(&state, &orders.orders).await?;
            let view = state.dashboard_api.dashboard(&classified, orders.preset(), today)?;

            if by_supplier {
                if cli.json {
                    print_json(&view.supplier_evolution)?;
                } else {
                    for p in &view.supplier_evolution {
                        println!(
                            "{:<36} {}  {:>5}/{:<5} {:>7.2}%",
                            p.supplier_name, p.month, p.otif_count, p.total_lines, p.otif_pct
                        );
                    }
                }
            } else if cli.json {
                print_json(&view.monthly_evolution)?;
            } else {
                for p in &view.monthly_evolution {
                    println!("{}  {:>5}/{:<5} {:>7.2}%", p.month, p.otif_count, p.total_lines, p.otif_pct);
                }
            }
        }

        Commands::Report {
            orders,
            supplier,
            out_dir,
        } => {
            let classified = load_classified(&state, &orders.orders).await?;
            let range = state
                .dashboard_api
                .resolve_period(&classified, orders.preset(), today)?;
            let bundle = state
                .report_api
                .supplier_report(&classified, &supplier, range, now)?;

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("无法创建输出目录 {}", out_dir.display()))?;
            let html_path = out_dir.join(&bundle.file_name);
            std::fs::write(&html_path, &bundle.html)
                .with_context(|| format!("无法写入 {}", html_path.display()))?;

            if cli.json {
                print_json(&bundle)?;
            } else {
                println!("{}", bundle.subject);
                println!("{} ({})", html_path.display(), bundle.report.grade.label());
                match &bundle.mailto {
                    Some(link) => println!("{}", link),
                    None => println!("{}", bundle.email_body),
                }
            }
        }

        Commands::Claims {
            orders,
            supplier,
            warehouses,
            min_days,
            documents,
            letters,
            export,
        } => {
            let classified = load_classified(&state, &orders).await?;
            let filter = ClaimFilter {
                supplier_name: supplier,
                warehouses: warehouses.into_iter().collect::<BTreeSet<_>>(),
                min_days_overdue: min_days,
                documents: documents.into_iter().collect::<BTreeSet<_>>(),
            };
            let overview = state.report_api.pending_claims(&classified, &filter, today);

            if let Some(target) = export {
                let path = if target.is_dir() {
                    target.join(default_claims_file_name(today))
                } else {
                    target
                };
                state.report_api.export_pending_claims(&overview.claims, &path)?;
            }

            if letters {
                let batch = state.report_api.claim_letters(&classified, &filter, now)?;
                if cli.json {
                    print_json(&batch)?;
                } else {
                    for letter in &batch.letters {
                        println!("{} <{}>", letter.supplier_name, letter.email);
                        println!("{}\n", letter.mailto());
                    }
                    for name in &batch.skipped_without_email {
                        println!("{}: no email registered", name);
                    }
                }
            } else if cli.json {
                print_json(&overview)?;
            } else {
                let s = &overview.summary;
                println!(
                    "{} lines, {} suppliers, {:.0} pending units, avg {:.1} days overdue",
                    s.line_count, s.supplier_count, s.pending_units, s.avg_days_overdue
                );
                for claim in &overview.claims {
                    let order = &claim.line.order;
                    println!(
                        "{:<14} {:<30} {:<8} {} {:>8.0} {:>5}",
                        order.document_no,
                        claim.line.supplier_name,
                        order.warehouse_code,
                        order.expected_date.format("%d/%m/%Y"),
                        order.pending_qty,
                        claim.days_overdue
                    );
                }
            }
        }

        Commands::Config { command } => match command {
            ConfigCommand::Show => {
                println!("{}", state.config_api.get_config_snapshot()?);
            }
            ConfigCommand::Set { key, value } => {
                state.config_api.update_config(&key, &value)?;
                state.dashboard_api.invalidate_cache();
                println!("{} = {}", key, value.trim());
            }
        },
    }

    Ok(())
}

/// 导入并分类订单
async fn load_classified(state: &AppState, files: &[PathBuf]) -> anyhow::Result<Arc<Vec<ClassifiedLine>>> {
    if let Some(missing) = files.iter().find(|p| !p.exists()) {
        bail!(t_with_args(
            "import.file_not_found",
            &[("path", &missing.display().to_string())]
        ));
    }
    let lines = state.dashboard_api.load_orders(files.to_vec()).await?;
    if lines.is_empty() {
        bail!("订单文件中没有数据行");
    }
    Ok(state.dashboard_api.classify(&lines)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
