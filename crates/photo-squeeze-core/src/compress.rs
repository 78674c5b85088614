//! Size-bounded JPEG compression.
//!
//! [`compress`] drives an arbitrary photo below a byte ceiling by searching
//! over two control variables: encoder quality and a cumulative downscale
//! factor. Output size is not predictable from either, so the search simply
//! re-encodes and measures:
//!
//! 1. Encode at full resolution and `start_quality`.
//! 2. Step quality down by `quality_step` until the size fits or the quality
//!    reaches `min_quality`.
//! 3. At the floor, shrink the ORIGINAL raster by the compounded
//!    `shrink_factor` (0.8, 0.64, ...) with Lanczos3, reset quality to
//!    `reset_quality`, and continue with step 2 on the smaller raster.
//!
//! The search stops when a downscale would take either side below
//! `min_dimension`, when `max_downscale_rounds` is used up, or when shrinking
//! no longer changes the raster. In that case the smallest attempt is returned
//! with `met_ceiling == false`. All buffers live in memory, so concurrent calls
//! share nothing.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::decode::{self, DecodeError, DecodedImage};
use crate::encode::{encode_image, EncodeError};

/// Default maximum artifact size in bytes.
pub const DEFAULT_CEILING_BYTES: usize = 50_000;
/// Default quality of the first attempt.
pub const DEFAULT_START_QUALITY: u8 = 85;
/// Default quality decrement between attempts.
pub const DEFAULT_QUALITY_STEP: u8 = 5;
/// Default quality floor before downscaling kicks in.
pub const DEFAULT_MIN_QUALITY: u8 = 10;
/// Default quality used right after each downscale.
pub const DEFAULT_RESET_QUALITY: u8 = 30;
/// Default per-round shrink multiplier.
pub const DEFAULT_SHRINK_FACTOR: f64 = 0.8;
/// Default smallest side length a downscale may produce.
pub const DEFAULT_MIN_DIMENSION: u32 = 8;
/// Default cap on downscale rounds.
pub const DEFAULT_MAX_DOWNSCALE_ROUNDS: u32 = 20;

/// Errors that abort a compression call.
///
/// Failing to meet the ceiling is not one of them; see
/// [`CompressedArtifact::met_ceiling`].
#[derive(Debug, Error)]
pub enum CompressError {
    /// The input could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] DecodeError),

    /// The encoder could not produce output for an attempt.
    #[error("Failed to encode image: {0}")]
    Encode(#[from] EncodeError),

    /// Resampling the working raster failed.
    #[error("Failed to resample image: {0}")]
    Resample(#[source] DecodeError),

    /// The search parameters are inconsistent.
    #[error("Invalid compression settings: {0}")]
    InvalidSettings(String),
}

/// Parameters of the compression search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    /// Maximum artifact size in bytes (inclusive).
    pub ceiling_bytes: usize,
    /// Quality of the first, full-resolution attempt (1-100).
    pub start_quality: u8,
    /// Quality decrement between attempts.
    pub quality_step: u8,
    /// Lowest quality used before resorting to downscaling.
    pub min_quality: u8,
    /// Quality used for the first attempt after each downscale.
    pub reset_quality: u8,
    /// Multiplier applied to the cumulative scale factor on each downscale (0-1, exclusive).
    pub shrink_factor: f64,
    /// A downscale never produces a side shorter than this.
    pub min_dimension: u32,
    /// Maximum number of downscale rounds.
    pub max_downscale_rounds: u32,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            ceiling_bytes: DEFAULT_CEILING_BYTES,
            start_quality: DEFAULT_START_QUALITY,
            quality_step: DEFAULT_QUALITY_STEP,
            min_quality: DEFAULT_MIN_QUALITY,
            reset_quality: DEFAULT_RESET_QUALITY,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
            min_dimension: DEFAULT_MIN_DIMENSION,
            max_downscale_rounds: DEFAULT_MAX_DOWNSCALE_ROUNDS,
        }
    }
}

impl CompressionSettings {
    /// Default settings with a different ceiling.
    pub fn with_ceiling(ceiling_bytes: usize) -> Self {
        Self {
            ceiling_bytes,
            ..Self::default()
        }
    }

    /// Check that the parameters describe a terminating, meaningful search.
    pub fn validate(&self) -> Result<(), CompressError> {
        let invalid = |msg: String| Err(CompressError::InvalidSettings(msg));

        if self.ceiling_bytes == 0 {
            return invalid("ceiling_bytes must be positive".to_string());
        }
        if self.quality_step == 0 {
            return invalid("quality_step must be at least 1".to_string());
        }
        if !(1..=100).contains(&self.min_quality)
            || self.min_quality > self.reset_quality
            || self.reset_quality > self.start_quality
            || self.start_quality > 100
        {
            return invalid(format!(
                "qualities must satisfy 1 <= min ({}) <= reset ({}) <= start ({}) <= 100",
                self.min_quality, self.reset_quality, self.start_quality
            ));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return invalid(format!(
                "shrink_factor must be between 0 and 1 exclusive, got {}",
                self.shrink_factor
            ));
        }
        if self.min_dimension == 0 {
            return invalid("min_dimension must be at least 1".to_string());
        }
        Ok(())
    }

    /// Upper bound on the number of encodes one call can perform.
    pub fn max_attempts(&self) -> usize {
        let steps = |from: u8| -> usize {
            let span = usize::from(from.saturating_sub(self.min_quality));
            span.div_ceil(usize::from(self.quality_step.max(1)))
        };
        let first_pass = 1 + steps(self.start_quality);
        let per_round = 1 + steps(self.reset_quality);
        first_pass + per_round * self.max_downscale_rounds as usize
    }
}

/// One encode performed during the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionAttempt {
    /// Encoder quality used.
    pub quality: u8,
    /// Cumulative scale relative to the original dimensions.
    pub scale_factor: f64,
    /// Width of the encoded raster.
    pub width: u32,
    /// Height of the encoded raster.
    pub height: u32,
    /// Encoded size in bytes.
    pub size: usize,
}

/// Result of a compression call.
#[derive(Debug, Clone)]
pub struct CompressedArtifact {
    /// Encoded JPEG bytes.
    pub bytes: Vec<u8>,
    /// Width of the encoded raster.
    pub width: u32,
    /// Height of the encoded raster.
    pub height: u32,
    /// Quality the returned bytes were encoded with.
    pub quality: u8,
    /// Cumulative scale relative to the original dimensions.
    pub scale_factor: f64,
    /// Ceiling the search was run against.
    pub ceiling_bytes: usize,
    /// Whether `bytes` fits within the ceiling.
    pub met_ceiling: bool,
    /// Every attempt in the order it was made.
    pub attempts: Vec<CompressionAttempt>,
}

impl CompressedArtifact {
    /// Size of the encoded bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the returned raster was downscaled.
    pub fn was_downscaled(&self) -> bool {
        self.scale_factor < 1.0
    }

    /// Give up the artifact, keeping only the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Decode `bytes` and compress the result below `settings.ceiling_bytes`.
///
/// # Errors
///
/// `CompressError::InvalidSettings` for bad parameters, `CompressError::Decode`
/// if `bytes` is not an image, and `CompressError::Encode` if an attempt
/// cannot be encoded. Missing the ceiling is reported through
/// [`CompressedArtifact::met_ceiling`], not as an error.
pub fn compress(
    bytes: &[u8],
    settings: &CompressionSettings,
) -> Result<CompressedArtifact, CompressError> {
    let image = decode::decode_image(bytes)?;
    compress_image(&image, settings)
}

/// [`compress`] with default settings and the given ceiling.
pub fn compress_with_ceiling(
    bytes: &[u8],
    ceiling_bytes: usize,
) -> Result<CompressedArtifact, CompressError> {
    compress(bytes, &CompressionSettings::with_ceiling(ceiling_bytes))
}

/// Compress an already-decoded raster below `settings.ceiling_bytes`.
pub fn compress_image(
    image: &DecodedImage,
    settings: &CompressionSettings,
) -> Result<CompressedArtifact, CompressError> {
    settings.validate()?;
    if image.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: image.width,
            height: image.height,
        }
        .into());
    }

    let mut search = Search::start(image, settings)?;
    if search.fits() {
        return Ok(search.finish(true));
    }

    loop {
        if search.quality > settings.min_quality {
            search.quality = search
                .quality
                .saturating_sub(settings.quality_step)
                .max(settings.min_quality);
        } else if search.downscale()? {
            search.quality = settings.reset_quality;
        } else {
            break;
        }

        search.attempt()?;
        if search.fits() {
            return Ok(search.finish(true));
        }
    }

    Ok(search.finish(false))
}

struct Search<'a> {
    original: &'a DecodedImage,
    settings: &'a CompressionSettings,
    working: Cow<'a, DecodedImage>,
    quality: u8,
    scale_factor: f64,
    rounds: u32,
    attempts: Vec<CompressionAttempt>,
    smallest: Vec<u8>,
    smallest_attempt: CompressionAttempt,
    last_size: usize,
}

impl<'a> Search<'a> {
    /// Perform the first, full-resolution attempt.
    fn start(
        original: &'a DecodedImage,
        settings: &'a CompressionSettings,
    ) -> Result<Self, CompressError> {
        let quality = settings.start_quality;
        let bytes = encode_image(original, quality)?;
        let attempt = CompressionAttempt {
            quality,
            scale_factor: 1.0,
            width: original.width,
            height: original.height,
            size: bytes.len(),
        };
        log_attempt(&attempt);

        Ok(Self {
            original,
            settings,
            working: Cow::Borrowed(original),
            quality,
            scale_factor: 1.0,
            rounds: 0,
            attempts: vec![attempt],
            smallest: bytes,
            smallest_attempt: attempt,
            last_size: attempt.size,
        })
    }

    fn fits(&self) -> bool {
        self.last_size <= self.settings.ceiling_bytes
    }

    /// Encode the working raster at the current quality.
    fn attempt(&mut self) -> Result<(), CompressError> {
        let bytes = encode_image(&self.working, self.quality)?;
        let attempt = CompressionAttempt {
            quality: self.quality,
            scale_factor: self.scale_factor,
            width: self.working.width,
            height: self.working.height,
            size: bytes.len(),
        };
        log_attempt(&attempt);

        self.attempts.push(attempt);
        self.last_size = attempt.size;
        // A fitting attempt is always the smallest so far, since every earlier
        // one was over the ceiling.
        if attempt.size < self.smallest_attempt.size {
            self.smallest = bytes;
            self.smallest_attempt = attempt;
        }
        Ok(())
    }

    /// Shrink the working raster by one more round. Returns false when no
    /// further useful downscale is possible.
    fn downscale(&mut self) -> Result<bool, CompressError> {
        if self.rounds >= self.settings.max_downscale_rounds {
            debug!(rounds = self.rounds, "downscale round limit reached");
            return Ok(false);
        }

        let scale_factor = self.scale_factor * self.settings.shrink_factor;
        let (width, height) =
            decode::scale_dimensions(self.original.width, self.original.height, scale_factor);

        if width < self.settings.min_dimension || height < self.settings.min_dimension {
            debug!(
                width,
                height,
                min_dimension = self.settings.min_dimension,
                "downscale would go below minimum dimension"
            );
            return Ok(false);
        }
        if (width, height) == self.working.dimensions() {
            debug!(width, height, "downscale no longer changes dimensions");
            return Ok(false);
        }

        let resized = decode::resize(self.original, width, height)
            .map_err(CompressError::Resample)?;

        self.working = Cow::Owned(resized);
        self.scale_factor = scale_factor;
        self.rounds += 1;
        Ok(true)
    }

    fn finish(self, met_ceiling: bool) -> CompressedArtifact {
        let attempt = self.smallest_attempt;
        if met_ceiling {
            info!(
                size = attempt.size,
                ceiling = self.settings.ceiling_bytes,
                quality = attempt.quality,
                scale_factor = attempt.scale_factor,
                attempts = self.attempts.len(),
                "compressed within ceiling"
            );
        } else {
            warn!(
                size = attempt.size,
                ceiling = self.settings.ceiling_bytes,
                attempts = self.attempts.len(),
                "could not compress within ceiling"
            );
        }

        CompressedArtifact {
            bytes: self.smallest,
            width: attempt.width,
            height: attempt.height,
            quality: attempt.quality,
            scale_factor: attempt.scale_factor,
            ceiling_bytes: self.settings.ceiling_bytes,
            met_ceiling,
            attempts: self.attempts,
        }
    }
}

fn log_attempt(attempt: &CompressionAttempt) {
    debug!(
        quality = attempt.quality,
        scale_factor = attempt.scale_factor,
        width = attempt.width,
        height = attempt.height,
        size = attempt.size,
        "compression attempt"
    );
}
