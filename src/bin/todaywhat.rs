use anyhow::Result;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::env;
use std::fs::File;
use std::sync::Arc;
use todaywhat::cli;
use todaywhat::client::NeisClient;
use todaywhat::config::Config;
use todaywhat::context::{AppContext, SharedContext, StandardContext};
use todaywhat::coordinator::{AppEvent, Command, RefreshCoordinator};
use todaywhat::present;
use todaywhat::reachability;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Duration;

const REACHABILITY_INTERVAL: Duration = Duration::from_secs(30);

fn init_logging(ctx: &dyn AppContext) {
    let level = env::var("TODAYWHAT_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    let log_config = ConfigBuilder::new().build();

    let result = match ctx.get_log_file_path().and_then(|p| File::create(p).ok()) {
        Some(file) => WriteLogger::init(level, log_config, file),
        None => TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto),
    };
    if let Err(e) = result {
        eprintln!("Logger init failed: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        cli::print_help("todaywhat");
        return Ok(());
    }

    let ctx: SharedContext = Arc::new(StandardContext::new(cli::parse_root(&args)));
    init_logging(ctx.as_ref());

    let config = match Config::load(ctx.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            // Unreadable or malformed config is fatal; a missing one is a first run.
            if !Config::is_missing_config_error(&e) {
                eprintln!("Error loading configuration:\n{}", e);
                std::process::exit(1);
            }
            log::info!("No configuration found, starting with defaults");
            Config::default()
        }
    };

    let client = NeisClient::from_config(&config)?;
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(32);
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(32);

    if let Some((host, port)) = reachability::endpoint_of(&config.base_url) {
        reachability::spawn_reachability_monitor(host, port, REACHABILITY_INTERVAL, cmd_tx.clone());
    }

    let coordinator = RefreshCoordinator::new(client, ctx.clone(), config);
    let actor = tokio::spawn(coordinator.run(cmd_rx, event_tx));

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim() == "h" {
                cli::print_commands();
                continue;
            }
            match cli::parse_command(&line) {
                Some(command) => {
                    let quit = command == Command::Quit;
                    if cmd_tx.send(command).await.is_err() || quit {
                        return;
                    }
                }
                None if !line.trim().is_empty() => {
                    println!("Unknown command, 'h' lists them.");
                }
                None => {}
            }
        }
        // stdin closed
        let _ = cmd_tx.send(Command::Quit).await;
    });

    while let Some(event) = event_rx.recv().await {
        match event {
            AppEvent::Render(directives) => println!("{}", present::to_plain_text(&directives)),
            AppEvent::SchoolRequired => {
                println!("학교를 설정합니다! 's <학교 이름>' 으로 학교 이름을 입력해주세요.")
            }
            AppEvent::SchoolNotFound(name) => {
                println!("'{}' 학교를 찾을 수 없어요. 다시 입력해주세요: s <학교 이름>", name)
            }
            AppEvent::SchoolSearchFailed(msg) => println!("학교 검색에 실패했어요: {}", msg),
        }
    }

    actor.await?;
    Ok(())
}
