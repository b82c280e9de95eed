//! Build script for rxhub-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates the board configuration constant from board.toml

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let board = validate_config();
    generate_config(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values read from board.toml
struct Board {
    tick_period_ms: u32,
    idle_ticks: u32,
    min_flush_ticks: u32,
    host_baud: u32,
    slave_baud: u32,
    pixel_baud: u32,
}

/// Validate board.toml configuration at compile time
fn validate_config() -> Board {
    // Re-run if board.toml changes
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the rxhub-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let timing = config.get("timing").and_then(|t| t.as_table());
    if timing.is_none() {
        errors.push("Missing [timing] section".to_string());
    }
    let links = config.get("links").and_then(|l| l.as_table());

    let tick_period_ms = read_int(timing, "timing", "tick_period_ms", None, 1..=1000, &mut errors);
    let idle_ms = read_int(timing, "timing", "idle_ms", None, 1..=600_000, &mut errors);
    let min_flush_ticks = read_int(timing, "timing", "min_flush_ticks", Some(0), 0..=1000, &mut errors);

    let baud_range = 1_200..=1_000_000;
    let host_baud = read_int(links, "links", "host_baud", Some(115_200), baud_range.clone(), &mut errors);
    let slave_baud = read_int(links, "links", "slave_baud", Some(9_600), baud_range.clone(), &mut errors);
    let pixel_baud = read_int(links, "links", "pixel_baud", Some(115_200), baud_range, &mut errors);

    if idle_ms < tick_period_ms {
        errors.push("[timing] idle_ms must be at least one tick_period_ms".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");

    Board {
        tick_period_ms,
        idle_ticks: idle_ms.div_ceil(tick_period_ms.max(1)),
        min_flush_ticks,
        host_baud,
        slave_baud,
        pixel_baud,
    }
}

/// Read an integer key, recording an error when it is missing or out of range
fn read_int(
    table: Option<&toml::map::Map<String, toml::Value>>,
    section: &str,
    key: &str,
    default: Option<u32>,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> u32 {
    match table.and_then(|t| t.get(key)) {
        Some(toml::Value::Integer(v)) if range.contains(v) => *v as u32,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            0
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => match default {
            Some(v) => v,
            None => {
                errors.push(format!("[{}] missing '{}'", section, key));
                0
            }
        },
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `board_config.rs` into OUT_DIR for `include!`
fn generate_config(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "pub const BOARD: BoardConfig = BoardConfig {{\n\
        \x20   timing: TimingConfig {{\n\
        \x20       tick_period_ms: {},\n\
        \x20       idle_ticks: {},\n\
        \x20       min_flush_ticks: {},\n\
        \x20   }},\n\
        \x20   links: LinkConfig {{\n\
        \x20       host_baud: {},\n\
        \x20       slave_baud: {},\n\
        \x20       pixel_baud: {},\n\
        \x20   }},\n\
        }};\n",
        board.tick_period_ms,
        board.idle_ticks,
        board.min_flush_ticks,
        board.host_baud,
        board.slave_baud,
        board.pixel_baud,
    );
    fs::write(out_dir.join("board_config.rs"), source).unwrap();
}
