//! Bounds-checked cursor over a state blob.
//!
//! Every read checks the remaining length first, so a short blob surfaces as
//! [`DecodeError::Truncated`] instead of a panic inside `bytes::Buf`.
use arrayvec::ArrayVec;
use bytes::Buf;

use super::DecodeError;
use crate::card::CardSlot;
use crate::game::GameType;
use crate::wager::{MAX_WAGERS, WAGER_RECORD_LEN, Wager};

type Result<T> = std::result::Result<T, DecodeError>;

pub(crate) struct StateReader<'a> {
    game: GameType,
    buf: &'a [u8],
    total: usize,
}

impl<'a> StateReader<'a> {
    pub fn new(game: GameType, bytes: &'a [u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty { game });
        }
        Ok(Self {
            game,
            buf: bytes,
            total: bytes.len(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn position(&self) -> usize {
        self.total - self.buf.remaining()
    }

    /// Fails unless at least `len` more bytes are available.
    pub fn require(&self, len: usize) -> Result<()> {
        if self.buf.remaining() < len {
            return Err(DecodeError::Truncated {
                game: self.game,
                expected: self.position() + len,
                actual: self.total,
            });
        }
        Ok(())
    }

    /// Fails unless the whole blob is at least `len` bytes long.
    pub fn require_total(&self, len: usize) -> Result<()> {
        if self.total < len {
            return Err(DecodeError::Truncated {
                game: self.game,
                expected: len,
                actual: self.total,
            });
        }
        Ok(())
    }

    pub fn invalid(&self, field: &'static str, value: u8) -> DecodeError {
        DecodeError::InvalidField {
            game: self.game,
            field,
            value,
        }
    }

    pub fn unsupported_version(&self, version: u8) -> DecodeError {
        DecodeError::UnsupportedVersion {
            game: self.game,
            version,
        }
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.require(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.require(8)?;
        Ok(self.buf.get_u64())
    }

    /// Reads a byte and maps it through `parse`, reporting `field` on failure.
    pub fn field<T>(&mut self, field: &'static str, parse: impl FnOnce(u8) -> Option<T>) -> Result<T> {
        let value = self.u8()?;
        parse(value).ok_or_else(|| self.invalid(field, value))
    }

    /// Trailing optional byte: present only if the blob continues.
    pub fn optional_u8(&mut self) -> Option<u8> {
        if self.buf.has_remaining() {
            Some(self.buf.get_u8())
        } else {
            None
        }
    }

    /// Trailing optional u64: present only if all eight bytes are.
    pub fn optional_u64(&mut self) -> Option<u64> {
        if self.buf.remaining() >= 8 {
            Some(self.buf.get_u64())
        } else {
            None
        }
    }

    /// Fails if anything is left after the last field.
    pub fn finish(&self) -> Result<()> {
        match self.buf.remaining() {
            0 => Ok(()),
            extra => Err(DecodeError::TrailingBytes {
                game: self.game,
                extra,
            }),
        }
    }

    pub fn card(&mut self, field: &'static str) -> Result<CardSlot> {
        self.field(field, CardSlot::from_byte)
    }

    pub fn cards<const N: usize>(&mut self, field: &'static str) -> Result<[CardSlot; N]> {
        self.require(N)?;
        let mut cards = [CardSlot::Hidden; N];
        for slot in cards.iter_mut() {
            *slot = self.card(field)?;
        }
        Ok(cards)
    }

    /// `[len][card × len]` with `len <= CAP`.
    pub fn card_run<const CAP: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<ArrayVec<CardSlot, CAP>> {
        let len = self.u8()?;
        if usize::from(len) > CAP {
            return Err(self.invalid(field, len));
        }
        self.require(usize::from(len))?;
        let mut cards = ArrayVec::new();
        for _ in 0..len {
            cards.push(self.card(field)?);
        }
        Ok(cards)
    }

    /// Reads the wager count byte and checks it against [`MAX_WAGERS`] and
    /// the bytes actually present.
    pub fn wager_count(&mut self, record_len: usize) -> Result<usize> {
        let count = usize::from(self.u8()?);
        if count > MAX_WAGERS {
            return Err(DecodeError::TooManyWagers {
                game: self.game,
                count,
                max: MAX_WAGERS,
            });
        }
        self.require(count * record_len)?;
        Ok(count)
    }

    /// Reads `count` 10-byte wager records, rejecting unknown kinds.
    pub fn wagers(&mut self, count: usize, known_kind: impl Fn(u8) -> bool) -> Result<Vec<Wager>> {
        self.require(count * WAGER_RECORD_LEN)?;
        let mut wagers = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = self.u8()?;
            if !known_kind(kind) {
                return Err(self.invalid("wager kind", kind));
            }
            let target = self.u8()?;
            let amount = self.u64()?;
            wagers.push(Wager::confirmed(kind, target, amount));
        }
        Ok(wagers)
    }
}
