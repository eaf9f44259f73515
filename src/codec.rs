//! HPDEC decoder and encoder.
//!
//! The format is whitespace-delimited text:
//!
//! ```text
//! HPDEC
//! <height> <width>
//! <r> <g> <b>        (height * width records, row-major)
//! ```
//!
//! The header stores height before width. Line breaks carry no meaning;
//! the decoder tokenizes on any ASCII whitespace. The encoder writes one
//! pixel per line.
//!
//! [`HpdecDecoder`] and [`HpdecEncoder`] are reusable config values. The
//! free functions ([`decode`], [`encode`], [`load`], [`save`], ...) use the
//! default configuration.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use log::debug;
use rgb::Rgb;

use crate::error::{Dimension, HpdecError, InvalidMetadata, Result, Truncation};
use crate::format::MAGIC;
use crate::info::ImageInfo;
use crate::limits::ResourceLimits;
use crate::pixel::{Pixel, PixelBuffer, try_alloc};

/// Longest token kept verbatim. Longer tokens can never be valid.
const MAX_TOKEN: usize = 32;

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decoder configuration.
///
/// ```
/// use hpdec::{HpdecDecoder, ResourceLimits};
///
/// let decoder = HpdecDecoder::new().with_limits(ResourceLimits::none().with_max_pixels(4));
/// let img = decoder.decode_bytes(b"HPDEC\n1 2\n0 0 0\n9 9 9\n").unwrap();
/// assert_eq!((img.width(), img.height()), (2, 1));
/// assert!(decoder.decode_bytes(b"HPDEC 3 3").is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HpdecDecoder {
    limits: ResourceLimits,
}

impl HpdecDecoder {
    /// Decoder with no resource limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply resource limits, checked right after the header is parsed.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current resource limits.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Parse only the tag and dimensions.
    ///
    /// Reads O(header) bytes and applies the same checks as [`decode`](Self::decode)
    /// up to, but not including, pixel allocation.
    pub fn probe_header(&self, data: &[u8]) -> Result<ImageInfo> {
        let mut tokens = Tokens::new(data);
        self.read_header(&mut tokens)
    }

    /// Decode a complete image from `reader`.
    ///
    /// No buffer is returned unless all `width * height` records parse.
    /// Tokens after the last record are ignored.
    pub fn decode<R: Read>(&self, reader: R) -> Result<PixelBuffer> {
        let mut tokens = Tokens::new(BufReader::new(reader));
        let info = self.read_header(&mut tokens)?;
        let expected = info.pixel_count();

        let mut pixels = try_alloc(expected).ok_or(InvalidMetadata::Unallocatable {
            width: info.width,
            height: info.height,
        })?;
        while pixels.len() < expected {
            let pixel = read_pixel(&mut tokens, pixels.len(), expected)?;
            pixels.push(pixel);
        }

        debug!("decoded {info} image");
        PixelBuffer::new(info.width, info.height, pixels)
    }

    /// Decode from an in-memory byte slice.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<PixelBuffer> {
        self.decode(data)
    }

    /// Open and decode the file at `path`.
    ///
    /// A file that cannot be opened is reported as [`HpdecError::Read`].
    pub fn load(&self, path: impl AsRef<Path>) -> Result<PixelBuffer> {
        let path = path.as_ref();
        let file = File::open(path).map_err(HpdecError::Read)?;
        if self.limits.max_file_size.is_some() {
            let len = file.metadata().map_err(HpdecError::Read)?.len();
            self.limits
                .check_file_size(len)
                .map_err(InvalidMetadata::from)?;
        }
        debug!("loading {}", path.display());
        self.decode(file)
    }

    fn read_header<R: BufRead>(&self, tokens: &mut Tokens<R>) -> Result<ImageInfo> {
        match tokens.next().map_err(HpdecError::Read)? {
            Some(tag) if tag.is(MAGIC) => {}
            Some(tag) => {
                return Err(HpdecError::Format {
                    found: Some(tag.display()),
                });
            }
            None => return Err(HpdecError::Format { found: None }),
        }

        let height = read_dimension(tokens, Dimension::Height)?;
        let width = read_dimension(tokens, Dimension::Width)?;
        if width == 0 || height == 0 {
            return Err(InvalidMetadata::Zero { width, height }.into());
        }
        let fits = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(size_of::<Pixel>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits {
            return Err(InvalidMetadata::Overflow { width, height }.into());
        }
        self.limits
            .check_dimensions(width, height)
            .map_err(InvalidMetadata::from)?;

        Ok(ImageInfo::new(width, height))
    }
}

fn read_dimension<R: BufRead>(tokens: &mut Tokens<R>, dimension: Dimension) -> Result<usize> {
    let token = tokens
        .next()
        .map_err(HpdecError::Read)?
        .ok_or(InvalidMetadata::Missing(dimension))?;
    token.parse().ok_or_else(|| {
        InvalidMetadata::Malformed {
            dimension,
            token: token.display(),
        }
        .into()
    })
}

fn read_pixel<R: BufRead>(tokens: &mut Tokens<R>, decoded: usize, expected: usize) -> Result<Pixel> {
    let mut channels = [0u8; 3];
    for channel in &mut channels {
        let truncated = |cause| HpdecError::TruncatedData {
            decoded,
            expected,
            cause,
        };
        let token = tokens
            .next()
            .map_err(HpdecError::Read)?
            .ok_or_else(|| truncated(Truncation::EndOfStream))?;
        *channel = token.parse().ok_or_else(|| {
            truncated(Truncation::InvalidChannel {
                token: token.display(),
            })
        })?;
    }
    let [r, g, b] = channels;
    Ok(Rgb::new(r, g, b))
}

/// Decode with the default configuration.
pub fn decode<R: Read>(reader: R) -> Result<PixelBuffer> {
    HpdecDecoder::new().decode(reader)
}

/// Decode an in-memory byte slice with the default configuration.
pub fn decode_bytes(data: &[u8]) -> Result<PixelBuffer> {
    HpdecDecoder::new().decode_bytes(data)
}

/// Load a file with the default configuration.
pub fn load(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    HpdecDecoder::new().load(path)
}

/// Parse the header of `data` with the default configuration.
pub fn probe_header(data: &[u8]) -> Result<ImageInfo> {
    HpdecDecoder::new().probe_header(data)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encoder for the HPDEC text format.
///
/// Output is `HPDEC`, then `height width`, then one `r g b` line per pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HpdecEncoder;

impl HpdecEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Write `buffer` to `writer`.
    ///
    /// Output is buffered and flushed before returning. Any write or flush
    /// failure is returned as [`HpdecError::Write`]; bytes already handed to
    /// `writer` are not rolled back.
    pub fn encode<W: Write>(&self, buffer: &PixelBuffer, writer: W) -> Result<()> {
        let mut out = BufWriter::new(writer);
        write_image(buffer, &mut out)
            .and_then(|()| out.flush())
            .map_err(HpdecError::Write)
    }

    /// Encode into a new byte vector.
    pub fn encode_to_vec(&self, buffer: &PixelBuffer) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.encode(buffer, &mut data)?;
        Ok(data)
    }

    /// Create (or truncate) the file at `path` and write `buffer` to it.
    ///
    /// A file that cannot be created is reported as [`HpdecError::Write`].
    pub fn save(&self, buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(HpdecError::Write)?;
        self.encode(buffer, file)?;
        debug!(
            "saved {}x{} image to {}",
            buffer.width(),
            buffer.height(),
            path.display()
        );
        Ok(())
    }
}

fn write_image<W: Write>(buffer: &PixelBuffer, out: &mut W) -> io::Result<()> {
    writeln!(out, "{MAGIC}")?;
    writeln!(out, "{} {}", buffer.height(), buffer.width())?;
    for row in buffer.rows() {
        for p in row {
            writeln!(out, "{} {} {}", p.r, p.g, p.b)?;
        }
    }
    Ok(())
}

/// Encode with the default configuration.
pub fn encode<W: Write>(buffer: &PixelBuffer, writer: W) -> Result<()> {
    HpdecEncoder::new().encode(buffer, writer)
}

/// Encode into a new byte vector with the default configuration.
pub fn encode_to_vec(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    HpdecEncoder::new().encode_to_vec(buffer)
}

/// Save to a file with the default configuration.
pub fn save(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    HpdecEncoder::new().save(buffer, path)
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Whitespace tokenizer over a buffered reader.
///
/// Only the first [`MAX_TOKEN`] bytes of a token are kept; longer tokens are
/// flagged so they never parse.
struct Tokens<R> {
    reader: R,
    buf: Vec<u8>,
    overlong: bool,
}

/// A borrowed token.
struct Token<'a> {
    bytes: &'a [u8],
    overlong: bool,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(MAX_TOKEN),
            overlong: false,
        }
    }

    /// Next token, or `None` at end of stream.
    fn next(&mut self) -> io::Result<Option<Token<'_>>> {
        self.buf.clear();
        self.overlong = false;
        loop {
            let chunk = match self.reader.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if chunk.is_empty() {
                break;
            }

            let mut used = 0;
            let mut complete = false;
            for &byte in chunk {
                used += 1;
                if byte.is_ascii_whitespace() {
                    if !self.buf.is_empty() || self.overlong {
                        complete = true;
                        break;
                    }
                } else if self.buf.len() < MAX_TOKEN {
                    self.buf.push(byte);
                } else {
                    self.overlong = true;
                }
            }
            self.reader.consume(used);
            if complete {
                break;
            }
        }

        if self.buf.is_empty() {
            return Ok(None);
        }
        Ok(Some(Token {
            bytes: &self.buf,
            overlong: self.overlong,
        }))
    }
}

impl Token<'_> {
    fn is(&self, text: &str) -> bool {
        !self.overlong && self.bytes == text.as_bytes()
    }

    fn parse<T: FromStr>(&self) -> Option<T> {
        if self.overlong {
            return None;
        }
        core::str::from_utf8(self.bytes).ok()?.parse().ok()
    }

    /// Lossy text for error messages.
    fn display(&self) -> String {
        let mut text = String::from_utf8_lossy(self.bytes).into_owned();
        if self.overlong {
            text.push_str("...");
        }
        text
    }
}
