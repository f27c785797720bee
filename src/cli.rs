use crate::parser::SchemeFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marking-scheme")]
#[command(about = "採点基準（マーキングスキーム）Excel取込ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 1ファイルを解析してJSONを出力
    Parse {
        /// マーキングスキームのExcelファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 入力形式 (tabular/judgement/auto)
        #[arg(short, long, default_value = "auto")]
        format: SchemeFormat,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ファイル・フォルダを解析・検証してデータベースに登録
    Import {
        /// Excelファイルまたはフォルダ
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 入力形式 (tabular/judgement/auto)
        #[arg(short, long, default_value = "auto")]
        format: SchemeFormat,

        /// データベースファイル（省略時は設定値）
        #[arg(long)]
        db: Option<PathBuf>,

        /// バッチサイズ（省略時は設定値）
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// ソースタグ（省略時は設定値）
        #[arg(short, long)]
        source: Option<String>,

        /// バッチ失敗時に中断する
        #[arg(long)]
        stop_on_error: bool,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 検証のみ（登録しない）
        #[arg(long)]
        dry_run: bool,

        /// 結果レポートJSONの出力先
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 登録件数を表示
    Count {
        /// ソースタグで絞り込む
        #[arg(short, long)]
        source: Option<String>,

        /// データベースファイル（省略時は設定値）
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// ソースタグ指定で削除
    Delete {
        /// 削除するソースタグ
        #[arg(short, long, required = true)]
        source: String,

        /// データベースファイル（省略時は設定値）
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// データベースパスを設定
        #[arg(long)]
        set_database: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
