use volley_shared::protocol::{Intent, KickDirection};

/// Keys held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub kick: bool,
}

impl InputState {
    /// Intents to emit this tick, in application order.
    ///
    /// Exactly one horizontal intent is always emitted, left taking priority
    /// over right. The kick points left while left is held, right otherwise.
    pub fn intents(&self) -> Vec<Intent> {
        let mut out = Vec::with_capacity(4);
        out.push(if self.left {
            Intent::MoveLeft
        } else if self.right {
            Intent::MoveRight
        } else {
            Intent::GoIdle
        });
        if self.up {
            out.push(Intent::Jump);
        }
        if self.down {
            out.push(Intent::BoostDown);
        }
        if self.kick {
            let direction = if self.left {
                KickDirection::Left
            } else {
                KickDirection::Right
            };
            out.push(Intent::Kick(direction));
        }
        out
    }
}
