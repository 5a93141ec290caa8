use MineSearch::cli::cli_main::run_interactive_menu;
use MineSearch::services::MineServices;
use MineSearch::settings::MineConfig;
use log::error;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

pub fn main() {
    let config = match MineConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = CombinedLogger::init(vec![TermLogger::new(
        config.level_filter(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]) {
        eprintln!("logger not initialized: {}", e);
    }

    let services = match MineServices::from_config(config) {
        Ok(services) => services,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run_interactive_menu(&services) {
        error!("terminal error: {}", e);
    }
}
