use anyhow::Result;
use clap::Parser;

use paa_collector::{App, Args, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    paa_collector::utils::logging::init();

    // 命令行参数 + 配置
    let args = Args::parse();
    let config = Config::load(&args)?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
