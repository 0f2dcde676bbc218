use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Visa,
    Mastercard,
    Unknown,
}

impl CardType {
    /// Scheme detection by leading digit only; anything unrecognized is UNKNOWN.
    pub fn detect(pan: &str) -> Self {
        if pan.starts_with('4') {
            CardType::Visa
        } else if pan.starts_with('5') {
            CardType::Mastercard
        } else {
            CardType::Unknown
        }
    }
}

impl Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let card_type = match self {
            CardType::Visa => "VISA",
            CardType::Mastercard => "MASTERCARD",
            CardType::Unknown => "UNKNOWN",
        };
        write!(f, "{}", card_type)
    }
}
