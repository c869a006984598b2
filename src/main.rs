//! xdispatch - Main entry point

use std::env;
use std::process;
use std::sync::Arc;

use xdispatch::server::{listener, Server, ServerConfig};
use xdispatch::VERSION;

fn print_usage() {
    println!("xdispatch v{}", VERSION);
    println!("X11 request dispatch server");
    println!();
    println!("Usage: xdispatch [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -display <n>          Display number (default: 1)");
    println!("  -tcp                  Listen on TCP (port 6000 + display)");
    println!("  -unix                 Listen on Unix socket (default on Unix)");
    println!("  -screen <WxHxD>       Root window geometry (default: 1024x768x24)");
    println!("  -h, --help            Show this help message");
    println!();
    println!("Examples:");
    println!("  xdispatch -display 1");
    println!("  xdispatch -display 2 -tcp -screen 1920x1080x24");
    println!();
}

#[derive(Debug)]
struct Config {
    display: u16,
    listen_tcp: bool,
    listen_unix: bool,
    server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            display: 1,
            listen_tcp: false,
            listen_unix: false,
            server: ServerConfig::default(),
        }
    }
}

/// Parse `WxHxD`
fn parse_screen(value: &str, config: &mut ServerConfig) -> Result<(), String> {
    let parts: Vec<&str> = value.split('x').collect();
    if parts.len() != 3 {
        return Err(format!("Invalid screen geometry: {}", value));
    }
    let invalid = |_: std::num::ParseIntError| format!("Invalid screen geometry: {}", value);
    let width: u16 = parts[0].parse().map_err(invalid)?;
    let height: u16 = parts[1].parse().map_err(invalid)?;
    let depth: u8 = parts[2].parse().map_err(invalid)?;
    if width == 0 || height == 0 || !matches!(depth, 1 | 8 | 15 | 16 | 24 | 32) {
        return Err(format!("Invalid screen geometry: {}", value));
    }

    config.screen_width = width;
    config.screen_height = height;
    config.root_depth = depth;
    Ok(())
}

fn parse_args() -> Result<Config, String> {
    let mut config = Config::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-display" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -display".to_string());
                }
                config.display = args[i]
                    .parse()
                    .map_err(|_| "Invalid display number".to_string())?;
            }
            "-screen" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -screen".to_string());
                }
                parse_screen(&args[i], &mut config.server)?;
            }
            "-tcp" => {
                config.listen_tcp = true;
            }
            "-unix" => {
                config.listen_unix = true;
            }
            arg => {
                return Err(format!("Unknown option: {}", arg));
            }
        }
        i += 1;
    }

    if !config.listen_tcp && !config.listen_unix {
        if cfg!(unix) {
            config.listen_unix = true;
        } else {
            config.listen_tcp = true;
        }
    }

    Ok(config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    log::info!("xdispatch v{}", VERSION);
    log::info!("Display: :{}", config.display);
    log::info!("TCP listening: {}", config.listen_tcp);
    log::info!("Unix socket listening: {}", config.listen_unix);

    let server = Arc::new(Server::new(config.server));
    let mut listeners = Vec::new();

    if config.listen_tcp {
        match listener::start_tcp_listener(config.display, Arc::clone(&server)) {
            Ok(handle) => listeners.push(handle),
            Err(e) => {
                eprintln!("Error: Failed to start TCP listener: {}", e);
                process::exit(1);
            }
        }
    }

    if config.listen_unix {
        #[cfg(unix)]
        {
            match listener::start_unix_listener(config.display, Arc::clone(&server)) {
                Ok(handle) => listeners.push(handle),
                Err(e) => {
                    eprintln!("Error: Failed to start Unix socket listener: {}", e);
                    process::exit(1);
                }
            }
        }

        #[cfg(not(unix))]
        {
            log::warn!("Unix sockets are not available on this platform");
        }
    }

    for handle in listeners {
        if handle.join().is_err() {
            log::error!("Listener thread panicked");
        }
    }
}
