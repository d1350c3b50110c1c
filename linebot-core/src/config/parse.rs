//! Minimal TOML parser for `robot.toml`
//!
//! Handles only the subset the robot configuration uses. It does NOT
//! implement the full TOML grammar.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` with strings, integers and booleans
//! - Arrays of strings: `order = ["stopped", "dance"]`
//! - Arrays of inline tables, optionally spread over several lines:
//!   `waypoints = [{ tick = 0, left = "med", right = "med" }, ...]`
//! - Comments (`# ...`)
//!
//! Unknown sections and keys are rejected so typos do not pass silently.

use heapless::{String as HString, Vec};

use super::types::{ConfigError, RobotConfig};
use crate::control::{DanceSequence, RulePrecedence, Waypoint, MAX_WAYPOINTS};
use crate::motor::SpeedLevel;
use crate::state::{Mode, ModeCycle};

/// Longest multi-line array value
const MAX_ARRAY_LEN: usize = 1024;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range for its type
    InvalidValue,
    /// Array exceeds its fixed capacity
    TooManyItems,
    /// Array opened but never closed
    UnterminatedArray,
    /// Values parsed but do not form a valid configuration
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(err: ConfigError) -> Self {
        ParseError::Config(err)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Scheduler,
    Button,
    Modes,
    Speed,
    Line,
    Trimpot,
    Beeper,
    Dance,
}

/// Dance values collected across the section
#[derive(Default)]
struct DanceDraft {
    waypoints: Option<Vec<Waypoint, MAX_WAYPOINTS>>,
    stop_tick: Option<u32>,
}

/// Parse and validate a configuration file
pub fn parse_config(input: &str) -> Result<RobotConfig, ParseError> {
    let mut config = RobotConfig::default();
    let mut section = Section::Root;
    let mut dance = DanceDraft::default();

    // Pending multi-line array: key plus accumulated text
    let mut pending: Option<(HString<32>, HString<MAX_ARRAY_LEN>)> = None;

    for raw in input.lines() {
        let line = strip_comment(raw).trim();

        if let Some((key, buf)) = pending.as_mut() {
            if line.is_empty() {
                continue;
            }
            buf.push(' ').map_err(|_| ParseError::TooManyItems)?;
            buf.push_str(line).map_err(|_| ParseError::TooManyItems)?;
            if line.ends_with(']') {
                apply_value(section, key, buf, &mut config, &mut dance)?;
                pending = None;
            }
            continue;
        }

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') && !line.contains('=') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;

        if value.starts_with('[') && !value.ends_with(']') {
            let key = HString::try_from(key).map_err(|_| ParseError::UnknownKey)?;
            let buf = HString::try_from(value).map_err(|_| ParseError::TooManyItems)?;
            pending = Some((key, buf));
            continue;
        }

        apply_value(section, key, value, &mut config, &mut dance)?;
    }

    if pending.is_some() {
        return Err(ParseError::UnterminatedArray);
    }

    if dance.waypoints.is_some() || dance.stop_tick.is_some() {
        let default = DanceSequence::default();
        let waypoints = match &dance.waypoints {
            Some(list) => list.as_slice(),
            None => default.waypoints(),
        };
        let stop_tick = dance.stop_tick.unwrap_or(default.stop_tick());
        config.dance = DanceSequence::new(waypoints, stop_tick)?;
    }

    config.validate()?;
    Ok(config)
}

/// Map a header name to its section
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "scheduler" => Ok(Section::Scheduler),
        "button" => Ok(Section::Button),
        "modes" => Ok(Section::Modes),
        "speed" => Ok(Section::Speed),
        "line" => Ok(Section::Line),
        "trimpot" => Ok(Section::Trimpot),
        "beeper" => Ok(Section::Beeper),
        "dance" => Ok(Section::Dance),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut RobotConfig,
    dance: &mut DanceDraft,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Scheduler, "tick_ms") => config.tick_ms = parse_int(value)?,
        (Section::Scheduler, "heartbeat_ticks") => config.heartbeat_ticks = parse_int(value)?,

        (Section::Button, "active_low") => config.button.active_low = parse_bool(value)?,

        (Section::Modes, "line_follow") => config.modes.line_follow = parse_bool(value)?,
        (Section::Modes, "dance") => config.modes.dance = parse_bool(value)?,
        (Section::Modes, "trimpot") => config.modes.trimpot = parse_bool(value)?,
        (Section::Modes, "order") => config.mode_order = Some(parse_mode_order(value)?),

        (Section::Speed, "slow") => config.speed.slow = parse_int(value)?,
        (Section::Speed, "slow_med") => config.speed.slow_med = parse_int(value)?,
        (Section::Speed, "med") => config.speed.med = parse_int(value)?,
        (Section::Speed, "fast") => config.speed.fast = parse_int(value)?,

        (Section::Line, "margin") => config.line.margin = parse_int(value)?,
        (Section::Line, "precedence") => config.line.precedence = parse_precedence(value)?,

        (Section::Trimpot, "channel") => config.trimpot.channel = parse_int(value)?,

        (Section::Beeper, "enabled") => config.beeper.enabled = parse_bool(value)?,

        (Section::Dance, "stop_tick") => dance.stop_tick = Some(parse_int(value)?),
        (Section::Dance, "waypoints") => dance.waypoints = Some(parse_waypoints(value)?),

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Drop a trailing `# comment` that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_speed(value: &str) -> Result<SpeedLevel, ParseError> {
    SpeedLevel::from_name(parse_string(value)?).ok_or(ParseError::InvalidValue)
}

fn parse_precedence(value: &str) -> Result<RulePrecedence, ParseError> {
    match parse_string(value)? {
        "priority" => Ok(RulePrecedence::Priority),
        "two_pass" => Ok(RulePrecedence::TwoPass),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Strip the outer brackets of an array value
fn array_body(value: &str) -> Result<&str, ParseError> {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('[') && value.ends_with(']') {
        Ok(value[1..value.len() - 1].trim())
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Parse `["stopped", "line_follow", ...]`
fn parse_mode_order(value: &str) -> Result<ModeCycle, ParseError> {
    let mut modes: Vec<Mode, 4> = Vec::new();

    for item in array_body(value)?.split(',') {
        let item = item.trim();
        if item.is_empty() {
            // Trailing comma
            continue;
        }
        let mode = Mode::from_name(parse_string(item)?).ok_or(ParseError::InvalidValue)?;
        modes.push(mode).map_err(|_| ParseError::TooManyItems)?;
    }

    Ok(ModeCycle::from_modes(&modes)?)
}

/// Parse `[{ tick = 0, left = "med", right = "med" }, ...]`
fn parse_waypoints(value: &str) -> Result<Vec<Waypoint, MAX_WAYPOINTS>, ParseError> {
    let mut waypoints = Vec::new();
    let mut rest = array_body(value)?;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        if !rest.starts_with('{') {
            return Err(ParseError::InvalidValue);
        }
        let end = rest.find('}').ok_or(ParseError::InvalidValue)?;
        let waypoint = parse_waypoint(&rest[1..end])?;
        waypoints.push(waypoint).map_err(|_| ParseError::TooManyItems)?;
        rest = &rest[end + 1..];
    }

    Ok(waypoints)
}

/// Parse the inside of one `{ tick = .., left = .., right = .. }` table
fn parse_waypoint(table: &str) -> Result<Waypoint, ParseError> {
    let mut tick = None;
    let mut left = None;
    let mut right = None;

    for pair in table.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, value) = parse_key_value(pair).ok_or(ParseError::InvalidValue)?;
        match key {
            "tick" => tick = Some(parse_int(value)?),
            "left" => left = Some(parse_speed(value)?),
            "right" => right = Some(parse_speed(value)?),
            _ => return Err(ParseError::UnknownKey),
        }
    }

    match (tick, left, right) {
        (Some(tick), Some(left), Some(right)) => Ok(Waypoint::new(tick, left, right)),
        _ => Err(ParseError::InvalidValue),
    }
}
