use std::fmt;

pub type Token<const N: usize> = [u8; N];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    Length { expected: usize, actual: usize },
    Character { offset: usize },
}

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, actual } => {
                write!(f, "expected {expected} hex characters, got {actual}")
            }
            Self::Character { offset } => write!(f, "invalid hex character at byte {offset}"),
        }
    }
}

impl std::error::Error for InvalidToken {}

pub fn parse_token<const N: usize>(hex: &str) -> Result<Token<N>, InvalidToken> {
    let hex = hex.trim();

    if hex.len() != N * 2 {
        return Err(InvalidToken::Length {
            expected: N * 2,
            actual: hex.len(),
        });
    }

    let mut result = [0; N];
    let iterator = TokenIterator { token: hex, pos: 0 };

    for (idx, value) in iterator.enumerate() {
        result[idx] = value?;
    }

    Ok(result)
}

struct TokenIterator<'t> {
    token: &'t str,
    pos: usize,
}

impl TokenIterator<'_> {
    fn next_value(&mut self) -> Option<Result<u8, InvalidToken>> {
        if self.pos >= self.token.len() {
            return None;
        }

        let offset = self.pos;
        let value = self.token.as_bytes()[offset];
        self.pos += 1;

        match value {
            b'0'..=b'9' => Some(Ok(value - b'0')),
            b'a'..=b'f' => Some(Ok(value - b'a' + 10)),
            b'A'..=b'F' => Some(Ok(value - b'A' + 10)),
            _ => Some(Err(InvalidToken::Character { offset })),
        }
    }
}

impl Iterator for TokenIterator<'_> {
    type Item = Result<u8, InvalidToken>;

    fn next(&mut self) -> Option<Self::Item> {
        let v1 = self.next_value()?;
        let v2 = self.next_value()?;

        Some(v1.and_then(|v1| v2.map(|v2| (v1 << 4) + v2)))
    }
}
