//! Build script for linebot-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates robot.toml at compile time with the boot-time parser

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const SPEED_NAMES: [&str; 5] = ["stop", "slow", "slow_med", "med", "fast"];
const MODE_NAMES: [&str; 4] = ["stopped", "line_follow", "dance", "trimpot"];
const MAX_DUTY: i64 = 1023;
const MAX_WAYPOINTS: usize = 16;
const DEFAULT_LAST_WAYPOINT: i64 = 450;

fn main() {
    setup_linker();
    validate_config();
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

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate robot.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=robot.toml");

    let config_path = Path::new("robot.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: robot.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds robot.toml at build time.                   ║\n\
            ║  Please create one in the linebot-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read robot.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in robot.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    // The boot-time parser is the authority; anything it rejects fails the build
    if let Err(e) = linebot_core::config::parse_config(&config_content) {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: robot.toml rejected by the firmware config parser        ║\n\
            ║                                                                  ║\n\
            ║  Error: {:<56} ║\n\
            ║                                                                  ║\n\
            ║  Check for misspelled sections or keys, unsupported TOML         ║\n\
            ║  syntax, or dance waypoints past stop_tick.                      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format!("{:?}", e)
        );
    }

    let mut errors = Vec::new();
    validate_scheduler(&config, &mut errors);
    validate_speed(&config, &mut errors);
    validate_line(&config, &mut errors);
    validate_modes(&config, &mut errors);
    validate_dance(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in robot.toml                      ║\n\
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

    println!("cargo:warning=robot.toml validated successfully");
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

fn int_in(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn validate_scheduler(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(tick) = int_in(config, "scheduler", "tick_ms") {
        if tick <= 0 {
            errors.push("[scheduler] tick_ms must be positive".to_string());
        }
    }
    if let Some(hb) = int_in(config, "scheduler", "heartbeat_ticks") {
        if !(1..=u16::MAX as i64).contains(&hb) {
            errors.push("[scheduler] heartbeat_ticks must be 1-65535".to_string());
        }
    }
}

fn validate_speed(config: &toml::Value, errors: &mut Vec<String>) {
    let defaults = [("slow", 750), ("slow_med", 800), ("med", 850), ("fast", 1000)];
    let mut previous = 0;

    for (key, default) in defaults {
        let duty = int_in(config, "speed", key).unwrap_or(default);
        if !(0..=MAX_DUTY).contains(&duty) {
            errors.push(format!("[speed] {} must be 0-{}", key, MAX_DUTY));
        } else if duty < previous {
            errors.push(format!("[speed] {} must not be below the slower levels", key));
        }
        previous = duty;
    }
}

fn validate_line(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(margin) = int_in(config, "line", "margin") {
        if !(0..=254).contains(&margin) {
            errors.push("[line] margin must be 0-254".to_string());
        }
    }

    if let Some(value) = config.get("line").and_then(|l| l.get("precedence")) {
        match value.as_str() {
            Some("priority") | Some("two_pass") => {}
            _ => errors.push("[line] precedence must be 'priority' or 'two_pass'".to_string()),
        }
    }

    if let Some(channel) = int_in(config, "trimpot", "channel") {
        if !(0..=3).contains(&channel) {
            errors.push("[trimpot] channel must be 0-3".to_string());
        }
    }
}

fn validate_modes(config: &toml::Value, errors: &mut Vec<String>) {
    let order = match config.get("modes").and_then(|m| m.get("order")) {
        Some(toml::Value::Array(order)) => order,
        Some(_) => {
            errors.push("[modes] order must be an array of mode names".to_string());
            return;
        }
        None => return,
    };

    let mut seen = Vec::new();
    for entry in order {
        match entry.as_str() {
            Some(name) if MODE_NAMES.contains(&name) => {
                if seen.contains(&name) {
                    errors.push(format!("[modes] order lists '{}' twice", name));
                }
                seen.push(name);
            }
            _ => errors.push(format!("[modes] unknown mode {}", entry)),
        }
    }

    if seen.first() != Some(&"stopped") {
        errors.push("[modes] order must start with 'stopped'".to_string());
    }
}

fn validate_dance(config: &toml::Value, errors: &mut Vec<String>) {
    let dance = match config.get("dance") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    let waypoints: &[toml::Value] = match dance.get("waypoints") {
        Some(toml::Value::Array(list)) => list.as_slice(),
        Some(_) => {
            errors.push("[dance] waypoints must be an array".to_string());
            return;
        }
        None => &[],
    };

    if waypoints.len() > MAX_WAYPOINTS {
        errors.push(format!("[dance] at most {} waypoints", MAX_WAYPOINTS));
    }

    let mut last_tick: Option<i64> = None;
    for (i, wp) in waypoints.iter().enumerate() {
        let wp = match wp.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[dance] waypoint {} must be a table", i));
                continue;
            }
        };

        match wp.get("tick").and_then(|t| t.as_integer()) {
            Some(tick) if tick >= 0 => {
                if last_tick.is_some_and(|last| tick <= last) {
                    errors.push(format!("[dance] waypoint {} tick must increase", i));
                }
                last_tick = Some(tick);
            }
            _ => errors.push(format!("[dance] waypoint {} needs a non-negative 'tick'", i)),
        }

        for side in ["left", "right"] {
            match wp.get(side).and_then(|s| s.as_str()) {
                Some(name) if SPEED_NAMES.contains(&name) => {}
                _ => errors.push(format!("[dance] waypoint {} has invalid '{}'", i, side)),
            }
        }
    }

    // Without a waypoint list the built-in choreography ends at tick 450
    if dance.get("waypoints").is_none() {
        last_tick = Some(DEFAULT_LAST_WAYPOINT);
    }

    let stop_tick = dance.get("stop_tick").and_then(|s| s.as_integer());
    if let (Some(stop), Some(last)) = (stop_tick, last_tick) {
        if stop < last {
            errors.push("[dance] stop_tick must not precede the last waypoint".to_string());
        }
    }
}
