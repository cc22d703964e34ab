use std::fmt;
use std::str::FromStr;

/// Solid trail color, parsed from `#rgb` or `#rrggbb` hex notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 0xff,
        g: 0xff,
        b: 0xff,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError;

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').ok_or(ParseColorError)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError);
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| ParseColorError);
        match hex.len() {
            // Shorthand doubles each digit: #f07 == #ff0077.
            3 => {
                let expand = |i: usize| channel(hex[i..i + 1].repeat(2).as_str());
                Ok(Self {
                    r: expand(0)?,
                    g: expand(1)?,
                    b: expand(2)?,
                })
            }
            6 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            _ => Err(ParseColorError),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
