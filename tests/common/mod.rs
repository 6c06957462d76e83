#![allow(dead_code)]

use chess_core::Move;
use game_server::{GameServer, GameSettings, ServerConfig, TimeControlKind};

/// Small deterministic generator so failures reproduce from the seed.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407))
    }

    pub fn next_below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as usize
    }
}

pub fn mv(text: &str) -> Move {
    Move::from_uci(text).unwrap()
}

pub fn settings(server: &GameServer, kind: TimeControlKind) -> GameSettings {
    GameSettings {
        time_control: server.config().time_control(kind),
        white_rating: 1500,
        black_rating: 1500,
        rated: true,
        spectate: true,
    }
}

pub fn server() -> GameServer {
    GameServer::new(ServerConfig::default())
}
