//! Per-channel arbitration between connected clients.
//!
//! For every mapped channel, the candidate clients for its light are
//! scanned linearly and the one with the lowest priority number wins; equal
//! priorities go to the client whose handshake is oldest. With a handful of
//! clients and a few hundred channels per tick, an O(clients) scan per
//! channel is the whole algorithm.

use lumen_types::{Channel, Light, LightIndex};

use crate::session::ClientState;

/// Pick the client that drives `light`, if any is eligible.
///
/// Exact ties on both priority and handshake time go to the client seen
/// first.
pub fn select_winner<'a, I>(clients: I, light: LightIndex) -> Option<&'a ClientState>
where
    I: Iterator<Item = &'a ClientState>,
{
    let mut winner: Option<&ClientState> = None;
    for client in clients.filter(|c| c.is_candidate_for(light)) {
        let better = match winner {
            None => true,
            Some(best) => {
                (client.priority(), client.handshake_time())
                    < (best.priority(), best.handshake_time())
            }
        };
        if better {
            winner = Some(client);
        }
    }
    winner
}

/// Fill the output fields of every mapped channel for render time `time`.
///
/// `lights` is the configured light list; it supplies the speed of lights
/// no client is driving. Channels whose light or color does not exist are
/// treated as unmapped and left alone.
pub fn fill_channels<'a, I>(lights: &[Light], clients: I, channels: &mut [Channel], time: i64)
where
    I: Iterator<Item = &'a ClientState> + Clone,
{
    for channel in channels.iter_mut() {
        let Some((light, color)) = channel.mapping() else {
            continue;
        };
        let Some(global) = lights.get(light) else {
            continue;
        };
        if color >= global.color_count() {
            continue;
        }

        let driving = select_winner(clients.clone(), light).and_then(|c| c.light(light));
        match driving {
            Some(source) => {
                channel.used = true;
                channel.value = source.color_value(color, time);
                channel.speed = source.speed();
                channel.gamma = source.gamma(color);
                channel.adjust = source.adjust(color);
                channel.blacklevel = source.blacklevel(color);
            }
            None => {
                channel.used = false;
                channel.speed = global.speed();
                channel.set_value_to_fallback();
                channel.gamma = 1.0;
                channel.adjust = 1.0;
                channel.blacklevel = 0.0;
            }
        }
    }
}
