//! The 27-symbol alphabet shared by payloads and keys.
//!
//! Symbols are the upper-case ASCII letters followed by the space character.
//! Each symbol is stored as its index (`A` = 0 through `Z` = 25, space = 26)
//! so the cipher never performs arithmetic on raw bytes.

use std::fmt;

use thiserror::Error;

/// Number of symbols in the alphabet.
pub const SYMBOL_COUNT: u8 = 27;

const SPACE_INDEX: u8 = SYMBOL_COUNT - 1;

/// A single member of the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u8);

impl Symbol {
    /// The space symbol, which sits after `Z`.
    pub const SPACE: Self = Self(SPACE_INDEX);

    /// Maps a wire byte onto the alphabet.
    ///
    /// Returns `None` for anything other than `A`–`Z` and space.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A'..=b'Z' => Some(Self(byte - b'A')),
            b' ' => Some(Self::SPACE),
            _ => None,
        }
    }

    /// Builds a symbol from its index, returning `None` when out of range.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < SYMBOL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Position of the symbol within the alphabet.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Wire byte for the symbol.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        if self.0 == SPACE_INDEX {
            b' '
        } else {
            b'A' + self.0
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", char::from(self.to_byte()))
    }
}

/// Raised when a byte outside the alphabet is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("byte {byte:#04x} at position {position} is outside the A-Z and space alphabet")]
pub struct AlphabetError {
    /// Zero-based offset of the offending byte.
    pub position: usize,
    /// The rejected byte.
    pub byte: u8,
}

/// An owned, validated run of symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Text {
    symbols: Vec<Symbol>,
}

impl Text {
    /// Validates raw bytes against the alphabet.
    ///
    /// # Errors
    ///
    /// Returns [`AlphabetError`] describing the first rejected byte.
    pub fn parse(bytes: &[u8]) -> Result<Self, AlphabetError> {
        let symbols = bytes
            .iter()
            .enumerate()
            .map(|(position, &byte)| Symbol::from_byte(byte).ok_or(AlphabetError { position, byte }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { symbols })
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true when the text holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Borrow the symbols in order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Returns the first `len` symbols, or `None` when the text is shorter.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Option<&[Symbol]> {
        self.symbols.get(..len)
    }

    /// Wire representation of the text.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.symbols.iter().map(|symbol| symbol.to_byte()).collect()
    }
}

impl FromIterator<Symbol> for Text {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols
            .iter()
            .try_for_each(|symbol| write!(formatter, "{symbol}"))
    }
}
