//! Text protocol spoken with lumen clients.
//!
//! Each message is one whitespace-tokenized line:
//!
//! ```text
//! hello
//! ping
//! get version
//! get lights
//! set priority <int>
//! set light <name> rgb <r> <g> <b>
//! set light <name> speed <float>
//! set light <name> interpolation <bool>
//! set light <name> use <bool>
//! ```
//!
//! Anything else is a protocol violation. There is no error reply; the
//! server simply drops the connection.

use std::fmt::Write as _;

use lumen_types::Light;

use crate::error::ProtocolError;

/// Protocol compatibility string sent in reply to `get version`.
pub const PROTOCOL_VERSION: &str = "5";

/// Line sent to a client rejected at admission.
pub const FULL_REPLY: &str = "full\n";

/// A decoded client request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Hello,
    Ping,
    GetVersion,
    GetLights,
    SetPriority(i32),
    SetLight { name: String, property: LightProperty },
}

/// The per-light field a `set light` command changes.
#[derive(Debug, Clone, PartialEq)]
pub enum LightProperty {
    Rgb([f32; 3]),
    Speed(f32),
    Interpolation(bool),
    Use(bool),
}

/// Decode one message. Light names are not resolved here.
pub fn parse(text: &str) -> Result<Command, ProtocolError> {
    let mut words = text.split_whitespace();
    let command = match words.next().ok_or(ProtocolError::Empty)? {
        "hello" => Command::Hello,
        "ping" => Command::Ping,
        "get" => match next_word(&mut words, "get target")? {
            "version" => Command::GetVersion,
            "lights" => Command::GetLights,
            other => return Err(ProtocolError::UnknownCommand(format!("get {}", other))),
        },
        "set" => match next_word(&mut words, "set target")? {
            "priority" => Command::SetPriority(parse_int(next_word(&mut words, "priority")?)?),
            "light" => parse_set_light(&mut words)?,
            other => return Err(ProtocolError::UnknownCommand(format!("set {}", other))),
        },
        other => return Err(ProtocolError::UnknownCommand(other.to_string())),
    };

    match words.next() {
        Some(extra) => Err(ProtocolError::UnexpectedArgument(extra.to_string())),
        None => Ok(command),
    }
}

fn parse_set_light<'a>(
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Command, ProtocolError> {
    let name = next_word(words, "light name")?.to_string();
    let property = match next_word(words, "light property")? {
        "rgb" => {
            let mut rgb = [0.0; 3];
            for component in rgb.iter_mut() {
                *component = parse_float(next_word(words, "rgb component")?)?;
            }
            LightProperty::Rgb(rgb)
        }
        "speed" => LightProperty::Speed(parse_float(next_word(words, "speed")?)?),
        "interpolation" => {
            LightProperty::Interpolation(parse_bool(next_word(words, "interpolation")?)?)
        }
        "use" => LightProperty::Use(parse_bool(next_word(words, "use")?)?),
        other => {
            return Err(ProtocolError::UnknownCommand(format!("set light {} {}", name, other)))
        }
    };
    Ok(Command::SetLight { name, property })
}

fn next_word<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<&'a str, ProtocolError> {
    words.next().ok_or(ProtocolError::MissingArgument(what))
}

fn parse_int(word: &str) -> Result<i32, ProtocolError> {
    word.parse()
        .map_err(|_| ProtocolError::InvalidInt(word.to_string()))
}

/// Parse a float, accepting `,` as the decimal separator as well as `.`.
fn parse_float(word: &str) -> Result<f32, ProtocolError> {
    let normalized = word.replace(',', ".");
    match normalized.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ProtocolError::InvalidFloat(word.to_string())),
    }
}

fn parse_bool(word: &str) -> Result<bool, ProtocolError> {
    match word.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ProtocolError::InvalidBool(word.to_string())),
    }
}

/// Reply to `get version`.
pub fn version_reply() -> String {
    format!("version {}\n", PROTOCOL_VERSION)
}

/// Reply to `get lights`: a count header plus one line per light.
pub fn lights_reply(lights: &[Light]) -> String {
    let mut out = format!("lights {}\n", lights.len());
    for light in lights {
        let v = light.vscan();
        let h = light.hscan();
        let _ = writeln!(
            out,
            "light {} scan {} {} {} {}",
            light.name(),
            v[0],
            v[1],
            h[0],
            h[1]
        );
    }
    out
}
