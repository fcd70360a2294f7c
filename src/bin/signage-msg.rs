//! Command-line tool to send messages to a running signage player

use std::env;
use std::path::PathBuf;

fn socket_path() -> PathBuf {
    let runtime_dir = env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("signage.sock")
}

fn print_usage() {
    eprintln!("Usage: signage-msg <command> [args...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  toggle-chrome                   Toggle window borders");
    eprintln!("  fullscreen [on|off]             Toggle or set fullscreen");
    eprintln!("  next | prev                     Switch content item");
    eprintln!("  show <index>                    Show a specific content item");
    eprintln!("  start | stop                    Start or stop content rotation");
    eprintln!("  interval <seconds>              Set the rotation interval");
    eprintln!("  reapply                         Re-apply display geometry");
    eprintln!("  status                          Get player status (JSON)");
    eprintln!("  quit                            Stop the player");
}

#[cfg(unix)]
fn main() {
    use std::io::{BufRead, BufReader, Write};
    use std::os::unix::net::UnixStream;

    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }

    let command = args.join(" ");
    let socket = socket_path();

    match UnixStream::connect(&socket) {
        Ok(mut stream) => {
            if let Err(e) = writeln!(stream, "{}", command) {
                eprintln!("Failed to send command: {}", e);
                std::process::exit(1);
            }

            let mut reader = BufReader::new(stream);
            let mut response = String::new();
            if let Err(e) = reader.read_line(&mut response) {
                eprintln!("Failed to read response: {}", e);
                std::process::exit(1);
            }

            let response = response.trim();
            println!("{}", response);
            if response.starts_with("ERR:") {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to connect to signage at {:?}: {}", socket, e);
            eprintln!("Is the player running?");
            std::process::exit(1);
        }
    }
}

#[cfg(not(unix))]
fn main() {
    print_usage();
    eprintln!();
    eprintln!("signage-msg needs Unix domain sockets; {:?} is unavailable here.", socket_path());
    std::process::exit(1);
}
