use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};

use crate::prelude::{RenderError, RenderResult};

/// Decodes an in-memory image, guessing the format from its magic bytes.
pub fn decode_bytes(bytes: &[u8]) -> RenderResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| RenderError::Decode(err.to_string()))?;
    Ok(reader.decode()?)
}

/// Asynchronous decode entry. Decoding large drone captures is CPU bound,
/// so it runs on the blocking pool; the await point is the compositor's
/// only suspension point.
pub async fn decode_bytes_async(bytes: Vec<u8>) -> RenderResult<DynamicImage> {
    tokio::task::spawn_blocking(move || decode_bytes(&bytes))
        .await
        .map_err(|err| RenderError::Decode(err.to_string()))?
}

/// Encodes a composited raster as PNG for storage or display embedding.
pub fn encode_png(image: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|err| RenderError::Decode(err.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn decode_rejects_garbage_bytes() {
        let err = decode_bytes(&[0x00, 0x01, 0x02, 0x03]).unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }

    #[test]
    fn png_round_trip_preserves_dimensions() {
        let image = RgbaImage::from_pixel(6, 4, Rgba([10, 20, 30, 255]));
        let bytes = encode_png(&image).unwrap();
        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.width(), 6);
        assert_eq!(decoded.height(), 4);
    }

    #[tokio::test]
    async fn async_decode_reports_failure_instead_of_hanging() {
        let outcome = decode_bytes_async(vec![0xde, 0xad]).await;
        assert!(outcome.is_err());
    }
}
