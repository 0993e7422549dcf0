//! Conversion between integers and hanzi numerals, and readings or meanings
//! for number-like expressions (`25.25`, `1998年`, `20%`, `三分之一`).

use pinyin_types::Word;

use crate::Dictionary;

const HANZI_DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// Magnitude suffixes indexed by power of ten.
const MAGNITUDES: [&str; 16] = [
    "", "十", "百", "千", "万", "十万", "百万", "千万", "亿", "十亿", "百亿", "千亿", "兆", "十兆",
    "百兆", "千兆",
];

/// Hanzi numeral for `n`, or the decimal digits when `n` is `10^16` or more.
pub fn number_as_hanzi(mut n: u128) -> String {
    if n < 10 {
        return HANZI_DIGITS[n as usize].to_string();
    }
    let mut hanzi = String::new();
    let mut needs_zero = false;
    for (power, magnitude) in MAGNITUDES.iter().enumerate().rev() {
        let unit = 10u128.pow(power as u32);
        // only reachable on the first iteration
        if n >= 10 * unit {
            return n.to_string();
        }
        let digit = (n / unit) as usize;
        n %= unit;
        if digit == 0 {
            needs_zero |= !hanzi.is_empty();
            continue;
        }
        // 十五 and 百二, not 一十五
        if digit == 1 && power < 3 && hanzi.is_empty() {
            hanzi.push_str(magnitude);
            continue;
        }
        if needs_zero {
            hanzi.push_str(HANZI_DIGITS[0]);
            needs_zero = false;
        }
        hanzi.push_str(HANZI_DIGITS[digit]);
        hanzi.push_str(magnitude);
    }
    hanzi
}

fn parse_hanzi_digit(s: &str) -> Option<(u8, &str)> {
    HANZI_DIGITS
        .iter()
        .zip(0u8..)
        .find_map(|(digit, value)| s.strip_prefix(digit).map(|rest| (value, rest)))
}

/// Parse a leading hanzi numeral; returns the value (if any) and the rest.
pub fn parse_hanzi_as_number(hanzi: &str) -> (Option<u128>, &str) {
    if let Some(rest) = hanzi.strip_prefix(HANZI_DIGITS[0]) {
        return (Some(0), rest);
    }
    if let Some(rest) = hanzi.strip_prefix('两') {
        return (Some(2), rest);
    }
    let mut rest = hanzi;
    let mut number = 0u128;
    for (power, magnitude) in MAGNITUDES.iter().enumerate().rev() {
        let (digit, candidate) = match parse_hanzi_digit(rest) {
            Some(parsed) => parsed,
            // a bare 十 or 百 means one of them, but never at the units
            None if power == 0 => continue,
            None => (1, rest),
        };
        if digit == 0 {
            rest = candidate;
            continue;
        }
        let Some(after) = candidate.strip_prefix(magnitude) else {
            continue;
        };
        rest = after;
        number += u128::from(digit) * 10u128.pow(power as u32);
    }
    ((number != 0).then_some(number), rest)
}

/// Callbacks for each number-like form. Digit arguments are ASCII decimal strings.
pub trait NumberLikeHandler {
    type Output;

    fn integer(&mut self, digits: &str) -> Self::Output;
    fn decimal(&mut self, leading: &str, trailing: &str) -> Self::Output;
    fn year(&mut self, digits: &str) -> Self::Output;
    fn percent(&mut self, digits: &str) -> Self::Output;
    fn fraction(&mut self, numerator: &str, denominator: &str) -> Self::Output;
}

fn digits_with_commas(s: &str) -> (String, &str) {
    let mut digits = String::new();
    let mut rest = s;
    loop {
        rest = rest.trim_start_matches([',', '，']);
        match rest.chars().next() {
            Some(c) if c.is_ascii_digit() => {
                digits.push(c);
                rest = &rest[1..];
            }
            _ => return (digits, rest),
        }
    }
}

fn plain_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn hanzi_digits(s: &str) -> (String, &str) {
    let mut digits = String::new();
    let mut rest = s;
    while let Some((digit, after)) = parse_hanzi_digit(rest) {
        digits.push(char::from(b'0' + digit));
        rest = after;
    }
    (digits, rest)
}

/// Number-like expressions written with Arabic digits.
pub fn parse_western_number_like<H: NumberLikeHandler>(
    expression: &str,
    handler: &mut H,
) -> Option<H::Output> {
    let (leading, rest) = digits_with_commas(expression);
    if leading.is_empty() {
        return None;
    }
    let rest = rest.trim();
    if let Some(after) = rest.strip_prefix(['.', '。']) {
        let (trailing, after) = plain_digits(after);
        if trailing.is_empty() || !after.trim().is_empty() {
            return None;
        }
        return Some(handler.decimal(&leading, trailing));
    }
    match rest {
        "" => Some(handler.integer(&leading)),
        "年" => Some(handler.year(&leading)),
        "%" | "％" => Some(handler.percent(&leading)),
        _ => {
            let after = rest.strip_prefix(['/', '\\'])?;
            let (trailing, after) = digits_with_commas(after);
            if trailing.is_empty() || !after.trim().is_empty() {
                return None;
            }
            Some(handler.fraction(&leading, &trailing))
        }
    }
}

/// Number-like expressions written with hanzi numerals.
pub fn parse_chinese_number_like<H: NumberLikeHandler>(
    expression: &str,
    handler: &mut H,
) -> Option<H::Output> {
    let (number, rest) = parse_hanzi_as_number(expression);
    let leading = number?.to_string();

    if let Some(after) = rest.strip_prefix('点') {
        let (trailing, after) = hanzi_digits(after);
        if trailing.is_empty() || !after.trim().is_empty() {
            return None;
        }
        return Some(handler.decimal(&leading, &trailing));
    }
    if rest.is_empty() {
        return Some(handler.integer(&leading));
    }
    if let Some(after) = rest.strip_prefix("分之") {
        let (numerator, after) = parse_hanzi_as_number(after);
        let numerator = numerator?.to_string();
        if !after.trim().is_empty() {
            return None;
        }
        return Some(if number == Some(100) {
            handler.percent(&numerator)
        } else {
            handler.fraction(&numerator, &leading)
        });
    }
    // years are read digit by digit: 一九九八年
    let (digits, rest) = hanzi_digits(expression);
    (!digits.is_empty() && rest == "年").then(|| handler.year(&digits))
}

/// Try the Western grammar first, then the Chinese one.
pub fn parse_number_like<H: NumberLikeHandler>(
    expression: &str,
    handler: &mut H,
) -> Option<H::Output> {
    parse_western_number_like(expression, handler)
        .or_else(|| parse_chinese_number_like(expression, handler))
}

/// Hanzi for a digit string; values too large for `u128` stay as digits.
fn hanzi_of(digits: &str) -> String {
    digits
        .parse::<u128>()
        .map(number_as_hanzi)
        .unwrap_or_else(|_| digits.to_string())
}

fn hanzi_per_digit(digits: &str) -> String {
    digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| HANZI_DIGITS[d as usize])
        .collect()
}

struct Reading<'a> {
    dictionary: &'a Dictionary,
}

impl NumberLikeHandler for Reading<'_> {
    type Output = Vec<Word>;

    fn integer(&mut self, digits: &str) -> Vec<Word> {
        self.dictionary.reading(&hanzi_of(digits))
    }

    fn decimal(&mut self, leading: &str, trailing: &str) -> Vec<Word> {
        let hanzi = format!("{}点{}", hanzi_of(leading), hanzi_per_digit(trailing));
        self.dictionary.reading(&hanzi)
    }

    fn year(&mut self, digits: &str) -> Vec<Word> {
        self.dictionary
            .reading(&format!("{}年", hanzi_per_digit(digits)))
    }

    fn percent(&mut self, digits: &str) -> Vec<Word> {
        self.dictionary
            .reading(&format!("百分之{}", hanzi_of(digits)))
    }

    fn fraction(&mut self, numerator: &str, denominator: &str) -> Vec<Word> {
        let hanzi = format!("{}分之{}", hanzi_of(denominator), hanzi_of(numerator));
        self.dictionary.reading(&hanzi)
    }
}

struct Meaning;

impl NumberLikeHandler for Meaning {
    type Output = String;

    fn integer(&mut self, digits: &str) -> String {
        digits.to_string()
    }

    fn decimal(&mut self, leading: &str, trailing: &str) -> String {
        format!("{leading}.{trailing}")
    }

    fn year(&mut self, digits: &str) -> String {
        format!("{digits}AD")
    }

    fn percent(&mut self, digits: &str) -> String {
        format!("{digits}%")
    }

    fn fraction(&mut self, numerator: &str, denominator: &str) -> String {
        format!("{numerator}/{denominator}")
    }
}

/// Chinese reading of a Western number-like expression, as it would be said aloud.
pub fn reading_from_number_like(expression: &str, dictionary: &Dictionary) -> Option<Vec<Word>> {
    parse_western_number_like(expression, &mut Reading { dictionary })
}

/// Western rendering of a number-like expression in either grammar.
pub fn meaning_from_number_like(expression: &str) -> Option<String> {
    parse_number_like(expression, &mut Meaning)
}
