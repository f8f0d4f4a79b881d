//! Modular substitution over the 27-symbol alphabet.

use thiserror::Error;

use crate::alphabet::{SYMBOL_COUNT, Symbol, Text};

/// Which way the pad is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Adds the key: `(message + key) mod 27`.
    Forward,
    /// Subtracts the key: `(message - key + 27) mod 27`.
    Inverse,
}

/// Raised when fewer key symbols are available than payload symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key holds {key_len} symbols but the payload needs {payload_len}")]
pub struct KeyTooShort {
    /// Symbols in the payload.
    pub payload_len: usize,
    /// Symbols available in the key.
    pub key_len: usize,
}

/// Combines one message symbol with one key symbol.
#[must_use]
pub const fn transform_symbol(message: Symbol, key: Symbol, direction: Direction) -> Symbol {
    // Both indices are below 27, so every intermediate value fits in a u8.
    let index = match direction {
        Direction::Forward => message.index() + key.index(),
        Direction::Inverse => message.index() + SYMBOL_COUNT - key.index(),
    };
    let reduced = if index >= SYMBOL_COUNT {
        index - SYMBOL_COUNT
    } else {
        index
    };
    match Symbol::from_index(reduced) {
        Some(symbol) => symbol,
        None => Symbol::SPACE,
    }
}

/// Applies the pad to a whole payload.
///
/// Only the first `payload.len()` key symbols are consumed; the output always
/// has exactly as many symbols as the payload.
///
/// # Errors
///
/// Returns [`KeyTooShort`] when the key has fewer symbols than the payload.
pub fn transform(payload: &Text, key: &Text, direction: Direction) -> Result<Text, KeyTooShort> {
    let key_symbols = key.prefix(payload.len()).ok_or(KeyTooShort {
        payload_len: payload.len(),
        key_len: key.len(),
    })?;
    Ok(payload
        .symbols()
        .iter()
        .zip(key_symbols)
        .map(|(&message, &key_symbol)| transform_symbol(message, key_symbol, direction))
        .collect())
}
