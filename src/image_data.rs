//! Encoded image values exchanged with callers and the service
//!
//! Callers hand images around as data URLs (`data:image/png;base64,...`),
//! the service answers with bare base64 payloads. [`EncodedImage`] owns the
//! decoded bytes together with their mime type and converts between both
//! textual forms.

use crate::error::{Result, SnapEditError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Mime type used when the payload format cannot be recognised
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// An encoded bitmap (PNG, JPEG, WebP, ...) plus its mime type
#[derive(Clone, PartialEq, Eq, Default)]
pub struct EncodedImage {
    mime_type: String,
    data: Vec<u8>,
}

impl EncodedImage {
    /// Wrap already-encoded bytes with an explicit mime type
    pub fn new<S: Into<String>>(data: Vec<u8>, mime_type: S) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// The absent image; every operation short-circuits on it
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap encoded bytes, detecting the mime type from their signature
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime_type = sniff_mime_type(&data).unwrap_or(FALLBACK_MIME_TYPE);
        Self::new(data, mime_type)
    }

    /// Parse a data URL or a bare base64 payload
    ///
    /// An empty string yields [`EncodedImage::empty`]. A bare payload gets its
    /// mime type from the decoded bytes.
    ///
    /// # Errors
    /// - Payload is not valid base64
    ///
    /// # Examples
    /// ```rust
    /// use snapedit::EncodedImage;
    ///
    /// let image = EncodedImage::from_data_url("data:image/gif;base64,R0lGODdh").unwrap();
    /// assert_eq!(image.mime_type(), "image/gif");
    /// assert_eq!(image.extension(), "gif");
    /// assert!(EncodedImage::from_data_url("").unwrap().is_empty());
    /// ```
    pub fn from_data_url(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::empty());
        }

        let declared = declared_mime_type(input);
        let data = decode_base64(strip_data_url_prefix(input))?;

        let mime_type = match declared {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => sniff_mime_type(&data)
                .unwrap_or(FALLBACK_MIME_TYPE)
                .to_string(),
        };

        Ok(Self { mime_type, data })
    }

    /// Decode a base64 field from a service response
    ///
    /// Service payloads carry no reliable mime type, so it is always taken
    /// from the decoded bytes, falling back to `fallback_mime`.
    ///
    /// # Errors
    /// - Payload is not valid base64
    pub fn from_base64(payload: &str, fallback_mime: &str) -> Result<Self> {
        let data = decode_base64(strip_data_url_prefix(payload.trim()))?;
        let mime_type = sniff_mime_type(&data).unwrap_or(fallback_mime).to_string();
        Ok(Self { mime_type, data })
    }

    /// Read an image from an async stream
    ///
    /// # Errors
    /// - Failure reading from the stream
    pub async fn from_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        Ok(Self::from_bytes(buffer))
    }

    /// Encode a decoded image in the given container format
    ///
    /// # Errors
    /// - The format cannot encode this image
    pub fn from_image(image: &DynamicImage, format: ImageFormat) -> Result<Self> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), format)?;
        Ok(Self::new(buffer, format.to_mime_type()))
    }

    /// Render as `data:<mime>;base64,<payload>`
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Render the payload alone
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File extension derived from the mime subtype (`image/jpeg` -> `jpeg`)
    #[must_use]
    pub fn extension(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map_or(self.mime_type.as_str(), |(_, subtype)| subtype)
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Container format detected from the byte signature
    #[must_use]
    pub fn format(&self) -> Option<ImageFormat> {
        image::guess_format(&self.data).ok()
    }

    /// Decode into pixels
    ///
    /// # Errors
    /// - Empty payload
    /// - Unknown or corrupted image data
    pub fn decode(&self) -> Result<DynamicImage> {
        if self.is_empty() {
            return Err(SnapEditError::invalid_input("cannot decode an empty image"));
        }
        Ok(image::load_from_memory(&self.data)?)
    }

    /// Pixel dimensions read from the image header
    ///
    /// # Errors
    /// - Empty payload
    /// - Unknown or corrupted image data
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        if self.is_empty() {
            return Err(SnapEditError::invalid_input(
                "cannot read dimensions of an empty image",
            ));
        }
        let reader = ImageReader::new(Cursor::new(&self.data)).with_guessed_format()?;
        Ok(reader.into_dimensions()?)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Mime type declared in a `data:<mime>;base64,` prefix
fn declared_mime_type(input: &str) -> Option<&str> {
    let rest = input.strip_prefix("data:")?;
    let (mime, _) = rest.split_once(";base64")?;
    Some(mime)
}

fn strip_data_url_prefix(input: &str) -> &str {
    if input.starts_with("data:") {
        input.split_once(',').map_or("", |(_, payload)| payload)
    } else {
        input
    }
}

fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        return Ok(STANDARD.decode(compact)?);
    }
    Ok(STANDARD.decode(payload)?)
}

fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().map(|f| f.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 20, 30, 255]),
        ));
        EncodedImage::from_image(&image, ImageFormat::Png)
            .unwrap()
            .into_data()
    }

    #[test]
    fn test_data_url_round_trip_keeps_declared_mime() {
        let bytes = png_bytes(3, 2);
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));

        let image = EncodedImage::from_data_url(&url).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.extension(), "png");
        assert_eq!(image.data(), bytes.as_slice());
        assert_eq!(image.to_data_url(), url);
        assert_eq!(image.dimensions().unwrap(), (3, 2));
    }

    #[test]
    fn test_bare_payload_sniffs_mime() {
        let bytes = png_bytes(1, 1);
        let image = EncodedImage::from_data_url(&STANDARD.encode(&bytes)).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.format(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_unknown_payload_falls_back_to_octet_stream() {
        let image = EncodedImage::from_data_url(&STANDARD.encode(b"not an image")).unwrap();
        assert_eq!(image.mime_type(), FALLBACK_MIME_TYPE);
        assert_eq!(image.extension(), "octet-stream");
        assert!(image.decode().is_err());
    }

    #[test]
    fn test_empty_input() {
        let image = EncodedImage::from_data_url("   ").unwrap();
        assert!(image.is_empty());
        assert!(matches!(image.decode(), Err(SnapEditError::InvalidInput(_))));
        assert!(matches!(
            image.dimensions(),
            Err(SnapEditError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_base64() {
        let result = EncodedImage::from_data_url("data:image/png;base64,@@@");
        assert!(matches!(result, Err(SnapEditError::Base64(_))));
    }

    #[test]
    fn test_from_base64_tolerates_prefix_and_line_breaks() {
        let bytes = png_bytes(2, 2);
        let encoded = STANDARD.encode(&bytes);
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let wrapped = format!("{head}\n{tail}\n");

        let image = EncodedImage::from_base64(&wrapped, "image/jpeg").unwrap();
        assert_eq!(image.data(), bytes.as_slice());
        assert_eq!(image.mime_type(), "image/png");

        let prefixed = format!("data:image/png;base64,{encoded}");
        let image = EncodedImage::from_base64(&prefixed, "image/png").unwrap();
        assert_eq!(image.data(), bytes.as_slice());
    }

    #[test]
    fn test_debug_hides_payload() {
        let image = EncodedImage::new(vec![1, 2, 3], "image/png");
        let debug = format!("{image:?}");
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }

    #[tokio::test]
    async fn test_from_reader() {
        let bytes = png_bytes(4, 4);
        let image = EncodedImage::from_reader(Cursor::new(bytes.clone()))
            .await
            .unwrap();
        assert_eq!(image.data(), bytes.as_slice());
        assert_eq!(image.mime_type(), "image/png");
    }
}
