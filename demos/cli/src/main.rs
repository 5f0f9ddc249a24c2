use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use healthband_core::{evaluate, MetricRegistry, MetricValue};
use healthband_report::{lifestyle_context, summarize_log_str, ReportConfig};

#[derive(Parser, Debug)]
#[command(
    name = "healthband-cli",
    about = "Phân loại và tóm tắt nhật ký sức khỏe JSON."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tóm tắt nhật ký thành bảng điều khiển đã phân loại.
    Summary {
        /// Đường dẫn tới file JSON nhật ký.
        #[arg(short, long)]
        input: PathBuf,
        /// Số ngày của cửa sổ tổng hợp.
        #[arg(long)]
        window_days: Option<u32>,
        /// In thêm khối ngữ cảnh cho trợ lý y tế.
        #[arg(long)]
        prompt_context: bool,
    },
    /// Phân loại một giá trị đơn lẻ.
    Classify {
        /// Id chỉ số, ví dụ heartRate hoặc bloodPressure.
        #[arg(short, long)]
        metric: String,
        /// Giá trị: một số, hoặc "120/80" cho huyết áp.
        #[arg(short, long)]
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let registry = MetricRegistry::default();

    match args.command {
        Command::Summary {
            input,
            window_days,
            prompt_context,
        } => {
            let data = std::fs::read_to_string(&input)
                .with_context(|| format!("Không đọc được file {:?}", input))?;

            let mut config = ReportConfig::default();
            if let Some(days) = window_days {
                config.window_days = days;
            }

            let summary = summarize_log_str(&data, &registry, &config)?;

            println!("Generated at: {}", summary.generated_at);
            println!("Window: {} days", summary.window_days);
            for status in &summary.metrics {
                println!(
                    "{:<20} {:<16} {:<8} {}",
                    status.label, status.display, status.band, status.message
                );
            }
            println!(
                "Plate fill: fruits & vegetables {:.0}%, whole grains {:.0}%, proteins {:.0}%",
                summary.plate.fruits_vegetables_pct,
                summary.plate.whole_grains_pct,
                summary.plate.proteins_pct
            );

            if prompt_context {
                println!("\n{}", lifestyle_context(&summary));
            }
        }
        Command::Classify { metric, value } => {
            let parsed = if value.contains('/') {
                MetricValue::parse_blood_pressure(&value)?
            } else {
                MetricValue::Scalar(
                    value
                        .parse::<f64>()
                        .with_context(|| format!("Giá trị không phải số: {value}"))?,
                )
            };

            let result = evaluate(&registry, &metric, parsed)?;
            println!("{} -> {} ({})", metric, result.band, result.color);
            println!("{}", result.message);
        }
    }

    Ok(())
}
