use anyhow::Context;
use clap::Parser;
use marking_scheme_import::{cli, config, importer, parser, pipeline, scanner, store};
use cli::{Cli, Commands};
use config::Config;
use importer::ImportOptions;
use pipeline::{PipelineOptions, PipelineReport};
use std::path::PathBuf;
use store::SqliteStore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Parse { file, format, output } => {
            let parsed = parser::parse_scheme(&file, format)?;
            let json = serde_json::to_string_pretty(&parsed)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!(
                        "✔ {}件 [{}] エラー {}件, 警告 {}件",
                        parsed.result.descriptors.len(),
                        parsed.format,
                        parsed.result.errors.len(),
                        parsed.result.warnings.len()
                    );
                    println!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Import {
            inputs,
            format,
            db,
            batch_size,
            source,
            stop_on_error,
            recursive,
            dry_run,
            report,
        } => {
            println!("📥 marking-scheme - 取込{}\n", if dry_run { " (ドライラン)" } else { "" });

            println!("[1/3] ファイルをスキャン中...");
            let files = scanner::collect_inputs(&inputs, recursive)?;
            println!("✔ {}件のファイルを検出\n", files.len());

            let options = PipelineOptions {
                format,
                import: ImportOptions {
                    continue_on_error: config.continue_on_error && !stop_on_error,
                    batch_size: batch_size.unwrap_or(config.batch_size),
                },
                source_tag: source.unwrap_or_else(|| config.source_tag.clone()),
                dry_run,
            };

            let db_path = resolve_db(&config, db)?;
            let mut store = store::open_for_import(&db_path, dry_run)
                .with_context(|| format!("データベースを開けません: {}", db_path.display()))?;

            println!("[2/3] 解析・検証・登録中...");
            let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
            let cancel = CancellationToken::new();
            let worker_cancel = cancel.clone();
            let mut handle = tokio::task::spawn_blocking(move || {
                pipeline::run_pipeline(&paths, &options, store.as_mut(), &worker_cancel)
            });

            let result = tokio::select! {
                joined = &mut handle => joined?,
                _ = tokio::signal::ctrl_c() => {
                    println!("\n中断要求を受け付けました。処理中のバッチ完了後に停止します...");
                    cancel.cancel();
                    handle.await?
                }
            };
            let pipeline_report = result?;
            print_report(&pipeline_report);

            if let Some(path) = report {
                println!("\n[3/3] レポートを保存中...");
                std::fs::write(&path, serde_json::to_string_pretty(&pipeline_report)?)?;
                println!("✔ レポートを保存: {}", path.display());
            }

            println!("\n✅ 取込完了");
        }

        Commands::Count { source, db } => {
            let db_path = resolve_db(&config, db)?;
            let store = SqliteStore::open(&db_path)?;
            let count = importer::count_descriptors(&store, source.as_deref())?;
            match source {
                Some(tag) => println!("ソース \"{}\": {}件", tag, count),
                None => println!("登録件数: {}件", count),
            }
        }

        Commands::Delete { source, db } => {
            let db_path = resolve_db(&config, db)?;
            let mut store = SqliteStore::open(&db_path)?;
            let deleted = importer::delete_descriptors_by_source(&mut store, &source)?;
            println!("✔ {}件を削除しました (ソース: {})", deleted, source);
        }

        Commands::Config { set_database, show } => {
            if let Some(path) = set_database {
                config.set_database(path)?;
                println!("✔ データベースパスを設定しました");
            }

            if show {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  データベース: {}", config.database_path()?.display());
                println!("  バッチサイズ: {}", config.batch_size);
                println!("  エラー時継続: {}", if config.continue_on_error { "する" } else { "しない" });
                println!("  ソースタグ: {}", config.source_tag);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn resolve_db(config: &Config, db: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => Ok(config.database_path()?),
    }
}

fn print_report(report: &PipelineReport) {
    println!("✔ 解析完了\n");
    for file in &report.files {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.path.display().to_string());
        if file.skipped() {
            println!("  ✘ {} - スキップ: {}", name, file.errors.join("; "));
        } else {
            println!(
                "  ✔ {} [{}] {}件 (警告 {}件)",
                name,
                file.format,
                file.descriptor_count,
                file.warnings.len()
            );
        }
    }

    println!();
    println!("候補: {}件", report.candidate_count);
    println!("  有効: {}件", report.valid_count);
    println!("  無効: {}件", report.invalid.len());
    println!("  警告付き: {}件", report.warning_count);

    if let Some(import) = &report.import {
        println!("登録:");
        println!("  新規: {}件", import.success_count);
        println!("  重複: {}件", import.duplicate_count);
        println!("  失敗: {}件", import.failed_count);
        println!("  所要時間: {} ms", import.duration_ms);
    }
}
