//! Delimiter sniffing over a short text sample.
//!
//! Two passes, in order:
//!
//! 1. **Quote adjacency**: quoted fields are almost always flanked by the
//!    delimiter (`,"a b",`), so the character most often found around them
//!    wins outright.
//! 2. **Frequency consistency**: a delimiter shows up the same number of
//!    times on nearly every line. For each 7-bit ASCII character the per-line
//!    counts are tallied in chunks of ten lines, and characters whose modal
//!    count covers enough of the lines become candidates. Ties between
//!    several candidates go to the usual delimiters first.
//!
//! The sample is usually cut mid-line, which is why the consistency bar
//! starts at 100% and relaxes down to 90%.

use std::io::{Read, Seek, SeekFrom};

use encoding_rs::{Encoding, UTF_8};

use crate::error::SniffError;
use crate::options::{DEFAULT_SAMPLE_CHARS, SplitOptions};

/// Delimiters tried first when several characters look equally plausible.
const PREFERRED: [char; 5] = [',', '\t', ';', ' ', ':'];

/// Lines examined per frequency round.
const CHUNK_LINES: usize = 10;

/// Worst-case encoded width of one character in ASCII-compatible encodings.
const MAX_BYTES_PER_CHAR: usize = 4;

/// Reads a sample from a seekable stream and infers its field delimiter.
#[derive(Debug, Clone, Copy)]
pub struct Sniffer {
    sample_chars: usize,
    encoding: &'static Encoding,
}

impl Default for Sniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sniffer {
    pub fn new() -> Self {
        Self {
            sample_chars: DEFAULT_SAMPLE_CHARS,
            encoding: UTF_8,
        }
    }

    /// Sniffer configured from split options (sample size and encoding).
    pub fn from_options(options: &SplitOptions) -> Self {
        Self {
            sample_chars: options.sample_chars,
            encoding: options.encoding,
        }
    }

    #[must_use]
    pub fn sample_chars(mut self, chars: usize) -> Self {
        self.sample_chars = chars;
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Samples from the current position, rewinds to the start, and returns
    /// the delimiter byte.
    pub fn sniff<R: Read + Seek>(&self, reader: &mut R) -> Result<u8, SniffError> {
        let sample = self.read_sample(reader)?;
        reader.seek(SeekFrom::Start(0))?;
        guess_delimiter(&sample).ok_or(SniffError::Undetectable)
    }

    fn read_sample<R: Read>(&self, reader: &mut R) -> std::io::Result<String> {
        let limit = self.sample_chars.saturating_mul(MAX_BYTES_PER_CHAR) as u64;
        let mut raw = Vec::new();
        reader.by_ref().take(limit).read_to_end(&mut raw)?;
        let (text, _) = self.encoding.decode_without_bom_handling(&raw);
        Ok(text.chars().take(self.sample_chars).collect())
    }
}

/// Infers the delimiter of a text sample, or `None` when it is too irregular.
pub fn guess_delimiter(sample: &str) -> Option<u8> {
    guess_from_quotes(sample).or_else(|| guess_from_frequencies(sample))
}

// =============================================================================
// Quote adjacency
// =============================================================================

#[derive(Clone, Copy)]
enum QuotePattern {
    /// `D"..."D`
    Enclosed,
    /// line start `"..."D`
    LeadsLine,
    /// `D"..."` line end
    EndsLine,
}

fn guess_from_quotes(sample: &str) -> Option<u8> {
    let chars: Vec<char> = sample.chars().collect();
    for pattern in [
        QuotePattern::Enclosed,
        QuotePattern::LeadsLine,
        QuotePattern::EndsLine,
    ] {
        let found = scan_quoted(&chars, pattern);
        if !found.is_empty() {
            return most_frequent(&found).and_then(ascii_byte);
        }
    }
    None
}

/// Collects the delimiter of every non-overlapping match, left to right.
fn scan_quoted(chars: &[char], pattern: QuotePattern) -> Vec<char> {
    let mut found = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        match match_at(chars, pos, pattern) {
            Some((delimiter, end)) => {
                found.push(delimiter);
                pos = end.max(pos + 1);
            }
            None => pos += 1,
        }
    }
    found
}

/// Tries one pattern at `pos`, returning the delimiter and the match end.
fn match_at(chars: &[char], pos: usize, pattern: QuotePattern) -> Option<(char, usize)> {
    match pattern {
        QuotePattern::Enclosed | QuotePattern::EndsLine => {
            let delimiter = *chars.get(pos).filter(|c| is_delimiter_candidate(**c))?;
            let trailing = match pattern {
                QuotePattern::Enclosed => Trailing::Char(delimiter),
                _ => Trailing::LineEnd,
            };
            // The optional space is greedy: try it before the bare quote.
            let with_space = (chars.get(pos + 1) == Some(&' '))
                .then(|| close_quote(chars, pos + 2, trailing))
                .flatten();
            with_space
                .or_else(|| close_quote(chars, pos + 1, trailing))
                .map(|(_, end)| (delimiter, end))
        }
        QuotePattern::LeadsLine => {
            if pos > 0 && chars[pos - 1] != '\n' {
                return None;
            }
            close_quote(chars, pos, Trailing::AnyDelimiter)
        }
    }
}

#[derive(Clone, Copy)]
enum Trailing {
    Char(char),
    AnyDelimiter,
    LineEnd,
}

/// Matches a quoted span opening at `open` and the text required after it,
/// extending to later quotes until the trailing condition holds.
fn close_quote(chars: &[char], open: usize, trailing: Trailing) -> Option<(char, usize)> {
    let quote = *chars.get(open).filter(|c| matches!(**c, '"' | '\''))?;
    for close in open + 1..chars.len() {
        if chars[close] != quote {
            continue;
        }
        let next = chars.get(close + 1).copied();
        match trailing {
            Trailing::Char(d) if next == Some(d) => return Some((d, close + 2)),
            Trailing::AnyDelimiter => {
                if let Some(d) = next.filter(|c| is_delimiter_candidate(*c)) {
                    let end = if chars.get(close + 2) == Some(&' ') {
                        close + 3
                    } else {
                        close + 2
                    };
                    return Some((d, end));
                }
            }
            Trailing::LineEnd if next.is_none() || next == Some('\n') => {
                return Some((quote, close + 1));
            }
            _ => {}
        }
    }
    None
}

fn is_delimiter_candidate(c: char) -> bool {
    !(c.is_alphanumeric() || c == '_' || matches!(c, '\n' | '"' | '\''))
}

/// Highest count wins; the first character seen breaks ties.
fn most_frequent(found: &[char]) -> Option<char> {
    let mut counts: Vec<(char, usize)> = Vec::new();
    for &c in found {
        match counts.iter_mut().find(|(seen, _)| *seen == c) {
            Some((_, n)) => *n += 1,
            None => counts.push((c, 1)),
        }
    }
    let best = counts.iter().map(|(_, n)| *n).max()?;
    counts.iter().find(|(_, n)| *n == best).map(|(c, _)| *c)
}

fn ascii_byte(c: char) -> Option<u8> {
    u8::try_from(c).ok().filter(u8::is_ascii)
}

// =============================================================================
// Frequency consistency
// =============================================================================

/// `(count per line, lines with that count)` in first-seen order.
type Histogram = Vec<(usize, usize)>;

/// `(modal count, lines agreeing minus lines disagreeing)`.
type Mode = (usize, i64);

fn guess_from_frequencies(sample: &str) -> Option<u8> {
    let lines: Vec<&str> = sample.split('\n').filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    let chunk = lines.len().min(CHUNK_LINES);

    let mut histograms: Vec<Histogram> = vec![Vec::new(); 127];
    let mut modes: Vec<Option<Mode>> = vec![None; 127];
    let mut delims: Vec<(u8, Mode)> = Vec::new();
    let mut iteration = 0usize;
    let mut start = 0usize;

    while start < lines.len() {
        iteration += 1;
        let end = (start + chunk).min(lines.len());
        for line in &lines[start..end] {
            let counts = count_ascii(line);
            for (byte, histogram) in histograms.iter_mut().enumerate() {
                let freq = counts[byte];
                match histogram.iter_mut().find(|(count, _)| *count == freq) {
                    Some((_, lines_seen)) => *lines_seen += 1,
                    None => histogram.push((freq, 1)),
                }
            }
        }

        for (byte, histogram) in histograms.iter().enumerate() {
            if let Some(mode) = modal_count(histogram) {
                modes[byte] = Some(mode);
            }
        }

        let total = (chunk * iteration).min(lines.len()) as f64;
        let mut consistency = 1.0f64;
        while delims.is_empty() && consistency >= 0.9 {
            for (byte, mode) in modes.iter().enumerate() {
                let Some((count, agreeing)) = *mode else {
                    continue;
                };
                if !is_frequency_candidate(byte) || count == 0 || agreeing <= 0 {
                    continue;
                }
                if agreeing as f64 / total >= consistency {
                    delims.push((byte as u8, (count, agreeing)));
                }
            }
            consistency -= 0.01;
        }

        if let [(byte, _)] = delims.as_slice() {
            return Some(*byte);
        }
        start = end;
    }

    if delims.is_empty() {
        return None;
    }
    for preferred in PREFERRED {
        if let Some((byte, _)) = delims.iter().find(|(b, _)| *b as char == preferred) {
            return Some(*byte);
        }
    }
    delims
        .iter()
        .max_by_key(|(byte, mode)| (*mode, *byte))
        .map(|(byte, _)| *byte)
}

fn count_ascii(line: &str) -> [usize; 128] {
    let mut counts = [0usize; 128];
    for byte in line.bytes().filter(u8::is_ascii) {
        counts[byte as usize] += 1;
    }
    counts
}

/// Mode of a histogram, penalised by every line that disagrees with it.
/// Characters that never occur have no mode.
fn modal_count(histogram: &Histogram) -> Option<Mode> {
    match histogram.as_slice() {
        [] | [(0, _)] => None,
        [(count, lines)] => Some((*count, *lines as i64)),
        _ => {
            let best = histogram.iter().map(|(_, lines)| *lines).max()?;
            let (index, &(count, lines)) = histogram
                .iter()
                .enumerate()
                .find(|(_, (_, l))| *l == best)?;
            let disagreeing: usize = histogram
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, (_, l))| *l)
                .sum();
            Some((count, lines as i64 - disagreeing as i64))
        }
    }
}

/// Line breaks are never delimiters.
fn is_frequency_candidate(byte: usize) -> bool {
    byte != b'\r' as usize && byte != b'\n' as usize
}
