use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cninfo-reports")]
#[command(about = "Download annual and periodic reports of A-share and Hong Kong stocks from cninfo")]
#[command(version)]
pub struct Cli {
    /// Stock code or Chinese short name (e.g. 600350, 00700, 山东高速)
    pub stock: String,

    /// Output directory. Defaults to a fresh directory under the system temp dir
    pub output_dir: Option<PathBuf>,

    /// Stock database snapshot (overrides CNINFO_STOCKS_PATH)
    #[arg(long)]
    pub stocks: Option<PathBuf>,
}

impl Cli {
    /// Output directory to use, creating a unique temp path when none was given
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            std::env::temp_dir().join(format!("cninfo_reports_{}", uuid::Uuid::new_v4().simple()))
        })
    }
}
