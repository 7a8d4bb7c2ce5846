use std::collections::HashMap;

use super::{Command, DecodeError, EncodeError, GameCodec};
use crate::game::GameType;
use crate::games::{
    BaccaratCodec, BlackjackCodec, CasinoWarCodec, CrapsCodec, HiLoCodec, RouletteCodec,
    SicBoCodec, ThreeCardCodec, UltimateHoldemCodec, VideoPokerCodec,
};
use crate::snapshot::Snapshot;

/// Lookup table from game id to its codec.
pub struct CodecRegistry {
    codecs: HashMap<GameType, Box<dyn GameCodec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registry holding the codec for every [`GameType`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BaccaratCodec);
        registry.register(BlackjackCodec);
        registry.register(CasinoWarCodec);
        registry.register(CrapsCodec);
        registry.register(VideoPokerCodec);
        registry.register(HiLoCodec);
        registry.register(RouletteCodec);
        registry.register(SicBoCodec);
        registry.register(ThreeCardCodec);
        registry.register(UltimateHoldemCodec);
        registry
    }

    /// Installs `codec`, returning the one it replaces.
    pub fn register(&mut self, codec: impl GameCodec + 'static) -> Option<Box<dyn GameCodec>> {
        self.codecs.insert(codec.game_type(), Box::new(codec))
    }

    pub fn get(&self, game: GameType) -> Option<&dyn GameCodec> {
        self.codecs.get(&game).map(|codec| codec.as_ref())
    }

    pub fn encode_command(&self, game: GameType, command: &Command) -> Result<Vec<u8>, EncodeError> {
        self.get(game)
            .ok_or(EncodeError::NoCodec(game))?
            .encode_command(command)
    }

    pub fn decode_state(&self, game: GameType, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        let snapshot = self
            .get(game)
            .ok_or(DecodeError::NoCodec(game))?
            .decode_state(bytes)?;
        debug_assert_eq!(snapshot.game_type(), game);
        Ok(snapshot)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_game() {
        let registry = CodecRegistry::with_defaults();
        for game in GameType::ALL {
            let codec = registry.get(game).expect("codec registered");
            assert_eq!(codec.game_type(), game);
        }
    }

    #[test]
    fn empty_registry_reports_missing_codec() {
        let registry = CodecRegistry::new();
        assert_eq!(
            registry.encode_command(GameType::Craps, &Command::Advance),
            Err(EncodeError::NoCodec(GameType::Craps))
        );
    }
}
