mod app;
mod config;
mod geometry;
mod ipc;
mod monitor;
mod performance;
mod pulse;
mod rotation;
mod startup;
mod surface;
mod window;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Removes the Unix socket file and stops the loop on SIGINT/SIGTERM.
fn install_shutdown_handler() {
    let socket = ipc::socket_path();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = std::fs::remove_file(&socket);
        ipc::push_ipc_command(ipc::IpcCommand::Quit);
    }) {
        log::warn!("Failed to install signal handler: {}", e);
    }
}

fn print_help() {
    println!(
        "signage {}
A dot-by-dot signage player: content authored at a fixed resolution is shown
pixel for pixel from the top-left corner of the screen

USAGE:
    signage [OPTIONS]

OPTIONS:
    -h, --help       Print this help message
    -v, --version    Print version information

ENVIRONMENT:
    RUST_LOG         Set log level (error, warn, info, debug, trace)
    SIGNAGE_CONFIG   Path to the config file
    SIGNAGE_SCREEN   Screen size for the headless backend (e.g. 3840x2160)

CONFIG:
    ~/.config/signage/config.toml

EXAMPLES:
    signage                     Run with default config
    RUST_LOG=debug signage      Run with debug logging
    signage-msg toggle-chrome   Toggle window borders of a running player",
        VERSION
    );
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if !args.is_empty() {
        // Only the first argument is processed (flags don't combine)
        match args[0].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-v" | "--version" => {
                println!("signage {}", VERSION);
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[0]);
                eprintln!("Try 'signage --help' for more information.");
                std::process::exit(1);
            }
        }
    }

    // Initialize logging (flush each line for interactive debugging).
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    logger
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {:>5} {}] {}",
                chrono::Utc::now().to_rfc3339(),
                record.level(),
                record.target(),
                record.args()
            )?;
            buf.flush()
        })
        .init();

    log::info!("Starting Signage v{}", VERSION);

    let config = config::load_config();

    if let Err(err) = ipc::start_ipc_listener(&ipc::socket_path()) {
        log::warn!("Failed to start IPC listener: {}", err);
    }
    install_shutdown_handler();

    let platform = window::detect_platform(config.display.target());
    let mut app = app::App::new(config, platform);
    app.run();

    let _ = std::fs::remove_file(ipc::socket_path());
}
