//! Split configuration.

use encoding_rs::{EUC_JP, Encoding, UTF_8};

use crate::error::{Result, SplitError};

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Default part ceiling in mebibytes.
pub const DEFAULT_MAX_PART_MIB: u64 = 250;

/// Characters read from the head of a file to sniff its delimiter.
pub const DEFAULT_SAMPLE_CHARS: usize = 2048;

/// Block size used when stripping NUL bytes.
pub const DEFAULT_CLEAN_BLOCK_SIZE: usize = 1024 * 1024;

/// File name of the NUL-free copy written next to the source.
pub const CLEANED_FILE_NAME: &str = "records_clean.csv";

/// Options for cleaning and splitting a CSV file.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Soft ceiling for the approximate size of one part, header included.
    pub max_part_bytes: u64,
    /// Text encoding of the source; parts are written in the same encoding.
    pub encoding: &'static Encoding,
    /// Sample length (in characters) handed to the delimiter sniffer.
    pub sample_chars: usize,
    /// Read block size for the NUL-stripping pass.
    pub clean_block_size: usize,
    /// File name of the cleaned copy.
    pub cleaned_file_name: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            max_part_bytes: DEFAULT_MAX_PART_MIB * MIB,
            encoding: UTF_8,
            sample_chars: DEFAULT_SAMPLE_CHARS,
            clean_block_size: DEFAULT_CLEAN_BLOCK_SIZE,
            cleaned_file_name: CLEANED_FILE_NAME.to_string(),
        }
    }
}

impl SplitOptions {
    /// Sets the part ceiling in mebibytes.
    #[must_use]
    pub fn with_max_part_mib(mut self, mib: u64) -> Self {
        self.max_part_bytes = mib.saturating_mul(MIB);
        self
    }

    /// Sets the part ceiling in bytes.
    #[must_use]
    pub fn with_max_part_bytes(mut self, bytes: u64) -> Self {
        self.max_part_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the encoding from a WHATWG label such as `utf-8` or `latin1`.
    pub fn with_encoding_label(self, label: &str) -> Result<Self> {
        Ok(self.with_encoding(encoding_for_label(label)?))
    }

    #[must_use]
    pub fn with_sample_chars(mut self, chars: usize) -> Self {
        self.sample_chars = chars;
        self
    }

    #[must_use]
    pub fn with_clean_block_size(mut self, bytes: usize) -> Self {
        self.clean_block_size = bytes;
        self
    }

    #[must_use]
    pub fn with_cleaned_file_name(mut self, name: impl Into<String>) -> Self {
        self.cleaned_file_name = name.into();
        self
    }

    /// Checks limits and encoding before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.max_part_bytes == 0 {
            return Err(invalid("maximum part size must be greater than 0"));
        }
        if self.sample_chars == 0 {
            return Err(invalid("sniff sample must hold at least one character"));
        }
        if self.clean_block_size == 0 {
            return Err(invalid("clean block size must be greater than 0"));
        }
        if self.cleaned_file_name.trim().is_empty() {
            return Err(invalid("cleaned file name must not be empty"));
        }
        check_encoding(self.encoding)?;
        Ok(())
    }
}

/// Resolves an encoding label and checks it with [`check_encoding`].
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .and_then(|encoding| check_encoding(encoding).ok())
        .ok_or_else(|| SplitError::UnsupportedEncoding {
            label: label.to_string(),
        })
}

/// Accepts encodings in which every byte below 0x80 is the ASCII character
/// itself, so records can be split on raw bytes before decoding.
///
/// That holds for UTF-8, single-byte encodings and EUC-JP. Shift_JIS, GBK,
/// gb18030, Big5 and EUC-KR reuse ASCII bytes inside multi-byte characters;
/// UTF-16 and ISO-2022-JP are not ASCII-compatible at all.
pub fn check_encoding(encoding: &'static Encoding) -> Result<&'static Encoding> {
    if encoding == UTF_8 || encoding == EUC_JP || encoding.is_single_byte() {
        Ok(encoding)
    } else {
        Err(SplitError::UnsupportedEncoding {
            label: encoding.name().to_string(),
        })
    }
}

fn invalid(reason: &str) -> SplitError {
    SplitError::InvalidOptions {
        reason: reason.to_string(),
    }
}
