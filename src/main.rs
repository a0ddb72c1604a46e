//! w3mimg - draw an image in the terminal via w3mimgdisplay
//!
//! Demo driver for the library: queries the image size, draws the image,
//! waits for Enter, then clears the drawn region and shuts the helper down.
//!
//! ```text
//! w3mimg photo.png                   # centered, helper from config or PATH
//! w3mimg -x 0 -y 0 photo.png         # top left corner
//! w3mimg --helper /usr/lib/w3m/w3mimgdisplay photo.png
//! ```

use std::env;
use std::io::BufRead;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use w3mimg::{Config as FileConfig, ImageDisplay, Placement};

/// Application configuration
struct Config {
    /// Helper executable path
    helper: Option<String>,
    /// X position in pixels
    x: Option<i32>,
    /// Y position in pixels
    y: Option<i32>,
    /// Follow draws with a drawing sync command
    auto_sync: bool,
    /// Image file to draw
    image: Option<String>,
    /// Helper was explicitly set via command line
    helper_from_cli: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            helper: None,
            x: None,
            y: None,
            auto_sync: true,
            image: None,
            helper_from_cli: false,
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("w3mimg {}", VERSION);
}

fn print_help() {
    eprintln!(
        "w3mimg {} - draw an image in the terminal via w3mimgdisplay",
        VERSION
    );
    eprintln!();
    eprintln!("Usage: w3mimg [OPTIONS] <IMAGE>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e, --helper <PATH>   Helper executable (default: from config");
    eprintln!("                        file, then \"w3mimgdisplay\" on $PATH;");
    eprintln!("                        usually /usr/lib/w3m/w3mimgdisplay)");
    eprintln!("  -x <PIXELS>           X position (default: centered)");
    eprintln!("  -y <PIXELS>           Y position (default: centered)");
    eprintln!("      --no-sync         Do not follow draws with a sync command");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.w3mimg/config.toml");
    eprintln!();
    eprintln!("The drawn image stays on screen until Enter is pressed, then the");
    eprintln!("region is cleared and the helper is terminated.");
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-e" | "--helper" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing helper argument".to_string());
                }
                config.helper = Some(args[i].clone());
                config.helper_from_cli = true;
            }
            "-x" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing x argument".to_string());
                }
                config.x = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("Invalid x position: {}", args[i]))?,
                );
            }
            "-y" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing y argument".to_string());
                }
                config.y = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("Invalid y position: {}", args[i]))?,
                );
            }
            "--no-sync" => {
                config.auto_sync = false;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
            arg => {
                if config.image.is_some() {
                    return Err("Only one image may be given".to_string());
                }
                config.image = Some(arg.to_string());
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Terminal drawing area in pixels, if the terminal reports it
fn terminal_pixels() -> Option<(u32, u32)> {
    match crossterm::terminal::window_size() {
        Ok(size) if size.width > 0 && size.height > 0 => {
            Some((size.width as u32, size.height as u32))
        }
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    let config = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Initialize logging to file
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from);

    let log_path = home
        .map(|h| h.join(".w3mimg").join("w3mimg.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("w3mimg.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    info!("w3mimg starting...");

    let image = match config.image.clone() {
        Some(image) => image,
        None => {
            eprintln!("Error: no image given");
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    run(config, image)
}

fn run(config: Config, image: String) -> anyhow::Result<()> {
    // Merge config: command line args override the config file
    let file_config = FileConfig::load();
    let helper = if config.helper_from_cli {
        config
            .helper
            .clone()
            .unwrap_or_else(|| file_config.helper_path().to_string())
    } else {
        file_config.helper_path().to_string()
    };

    info!("Helper: {}", helper);

    let mut display = ImageDisplay::spawn(&helper, config.auto_sync)?;

    let (img_w, img_h) = display.get_size(&image)?;
    info!("Image size: {}x{}", img_w, img_h);

    // Center in the terminal when no position was given
    let centered = terminal_pixels()
        .map(|(tw, th)| {
            (
                (tw.saturating_sub(img_w) / 2) as i32,
                (th.saturating_sub(img_h) / 2) as i32,
            )
        })
        .unwrap_or((0, 0));
    let x = config.x.unwrap_or(centered.0);
    let y = config.y.unwrap_or(centered.1);

    display.draw(
        &image,
        1,
        Placement {
            w: img_w,
            h: img_h,
            ..Placement::at(x, y)
        },
    )?;
    display.nop()?;

    eprintln!("Press Enter to clear and exit...");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);

    display.clear(x, y, img_w, img_h)?;
    display.sync()?;
    display.close()?;

    info!("w3mimg exiting");
    Ok(())
}
