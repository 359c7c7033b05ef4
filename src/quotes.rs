// Rotating blessings shown on the gift card.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
}

pub const BLESSINGS: &[Quote] = &[
    Quote { text: "For unto you is born this day a Saviour, which is Christ the Lord." },
    Quote { text: "Glory to God in the highest, and on earth peace, goodwill toward men." },
    Quote { text: "May the joy of Christmas fill your home with light and your heart with peace." },
    Quote { text: "The light shines in the darkness, and the darkness has not overcome it." },
    Quote { text: "May Mother Mary keep you and your family under her mantle this new year." },
    Quote { text: "Let every heart prepare Him room, and let heaven and nature sing." },
    Quote { text: "Wishing you hope that never fades and love that never ends." },
    Quote { text: "Peace I leave with you; my peace I give to you. Let not your heart be troubled." },
];

/// Hands out blessings in a fixed order, wrapping around at the end.
pub struct QuoteProvider {
    quotes: &'static [Quote],
    cursor: usize,
}

impl QuoteProvider {
    pub fn new(offset: usize) -> Self {
        Self::with_quotes(BLESSINGS, offset)
    }

    pub fn with_quotes(quotes: &'static [Quote], offset: usize) -> Self {
        let cursor = if quotes.is_empty() { 0 } else { offset % quotes.len() };
        Self { quotes, cursor }
    }

    /// Current blessing; the rotation pointer moves on to the next one.
    pub fn next_quote(&mut self) -> Option<Quote> {
        let quote = *self.quotes.get(self.cursor)?;
        self.cursor = (self.cursor + 1) % self.quotes.len();
        Some(quote)
    }
}
