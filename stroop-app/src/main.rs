mod app;

use app::App;
use std::path::PathBuf;
use stroop_app::load_config;

const DEFAULT_DATA_PATH: &str = "stroop_data.jsonl";

/// Usage: `stroop [config.json] [data.jsonl]`
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args_os().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let data_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let config = load_config(config_path.as_deref())?;
    let app = App::new(config, &data_path)?;
    app.run()?;

    Ok(())
}
