use clap::{Args, Parser, Subcommand, ValueEnum};
use inventory_table_common::{ColumnId, RowId, SortDirection};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inventory-table")]
#[command(about = "在庫監査テーブルの閲覧・監査ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// テーブルの表示条件
#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// 在庫レコードJSONファイル
    #[arg(required = true)]
    pub records: PathBuf,

    /// ロケーション名
    #[arg(short, long)]
    pub location: Option<String>,

    /// ロケーションID（一致しないレコードを除外）
    #[arg(long)]
    pub location_id: Option<i64>,

    /// 閲覧者ロール (Admin / Staff / "Temporary staff" / その他)
    #[arg(short, long)]
    pub role: Option<String>,

    /// ソート列 (name/qr/amount/owner/auditDate/newDate/auditStatus)
    #[arg(short, long, value_parser = parse_column)]
    pub sort: Option<ColumnId>,

    /// ソート方向
    #[arg(short, long, default_value = "asc")]
    pub direction: Direction,

    /// ページ番号（0始まり）
    #[arg(short, long, default_value = "0")]
    pub page: usize,

    /// ページサイズ
    #[arg(long)]
    pub page_size: Option<usize>,

    /// 選択する行ID
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<RowId>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// テーブルを表示
    Show {
        #[command(flatten)]
        table: TableArgs,
    },

    /// 行を監査済みにする
    Audit {
        #[command(flatten)]
        table: TableArgs,

        /// 監査する行ID
        #[arg(long, required = true)]
        id: RowId,
    },

    /// 設定を表示/編集
    Config {
        /// 既定のページサイズを設定
        #[arg(long)]
        page_size: Option<usize>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Asc => SortDirection::Asc,
            Direction::Desc => SortDirection::Desc,
        }
    }
}

fn parse_column(s: &str) -> Result<ColumnId, String> {
    s.parse()
}
