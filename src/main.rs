use std::time::Instant;
use anyhow::Context;
use rangedown::cli;
use rangedown::core::{Downloader, RunReport};
use rangedown::ui::{self, DownloadSummary, ProgressManager};
use rangedown::utils::logger::init_logger;
use rangedown::utils::validator::validate_config;

const EXIT_INCOMPLETE: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 解析参数和配置
    let (args, config) = match cli::Args::parse_args() {
        Ok((args, config)) => (args, config),
        Err(e) => {
            eprintln!("参数解析失败: {}", e);
            std::process::exit(1);
        }
    };
    validate_config(&config)?;

    init_logger(&config.log_level, config.log_file.as_deref())?;
    log::info!("程序启动");
    log::info!("配置文件路径: {}", args.config);
    log::info!("{}", config.get_summary());

    println!("\n索引文件: {}", args.index);
    println!("每个文件的并行连接数: {}", config.thread_count);
    if let Some(range) = args.range {
        println!("字节范围: {}", range);
    }

    let downloader = Downloader::from_config(&config, ProgressManager::new()).with_range(args.range);

    println!("\n|----------------------开始下载----------------------|\n");
    let started = Instant::now();
    let reports = match downloader.run(&args.index).await {
        Ok(reports) => reports,
        Err(e) if e.is_fatal_for_run() => {
            log::error!("{}", e);
            ui::print_error(&e.to_string());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let summary = DownloadSummary::from_reports(&reports, started.elapsed());
    println!("{}", summary);

    let report = RunReport::new(&args.index, reports);
    if let Some(path) = &config.report_file {
        report
            .save(path)
            .with_context(|| format!("无法写入报告 {}", path))?;
        log::info!("报告已写入 {}", path);
    }

    log::info!(
        "下载完成 - 成功: {}, 失败: {}",
        summary.success_count,
        summary.total_files - summary.success_count
    );

    if args.strict && !report.all_downloaded() {
        std::process::exit(EXIT_INCOMPLETE);
    }

    Ok(())
}
