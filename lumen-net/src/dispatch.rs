//! Executes decoded commands against one client's state.
//!
//! Execution runs with the registry lock held, so it never touches the
//! socket: it returns the reply text and the caller writes it afterwards.

use log::{debug, info};

use crate::error::ProtocolError;
use crate::framing::Message;
use crate::protocol::{self, Command, LightProperty};
use crate::session::ClientState;

/// Apply `command`, received at `time`, to `state`.
///
/// Returns the reply to send, if the command has one. `peer` is only used
/// for logging.
pub fn execute(
    state: &mut ClientState,
    command: Command,
    time: i64,
    peer: &str,
) -> Result<Option<String>, ProtocolError> {
    match command {
        Command::Hello => {
            info!("{} said hello", peer);
            state.set_handshake_time(time);
            Ok(Some("hello\n".to_string()))
        }
        Command::Ping => Ok(Some("ping\n".to_string())),
        Command::GetVersion => Ok(Some(protocol::version_reply())),
        Command::GetLights => Ok(Some(protocol::lights_reply(state.lights()))),
        Command::SetPriority(priority) => {
            state.set_priority(priority);
            info!("{} priority set to {}", peer, state.priority());
            Ok(None)
        }
        Command::SetLight { name, property } => {
            let light = state
                .light_by_name_mut(&name)
                .ok_or(ProtocolError::UnknownLight(name.clone()))?;
            debug!("{} set light {} {:?}", peer, name, property);
            match property {
                LightProperty::Rgb(rgb) => light.set_rgb(rgb, time),
                LightProperty::Speed(speed) => light.set_speed(speed),
                LightProperty::Interpolation(on) => light.set_interpolation(on),
                LightProperty::Use(on) => light.set_use(on),
            }
            Ok(None)
        }
    }
}

/// Decode and execute one framed message.
pub fn handle_message(
    state: &mut ClientState,
    message: &Message,
    peer: &str,
) -> Result<Option<String>, ProtocolError> {
    let command = protocol::parse(&message.text)?;
    execute(state, command, message.time, peer)
}
