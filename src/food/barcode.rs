use crate::food::imaging::{load_image, DecodeError};
use log::{debug, info};

/// Extracts a barcode symbol from a still image.
pub trait BarcodeDecoder: Send + Sync {
    /// `Ok(None)` means the image was readable but held no symbol.
    fn decode(&self, image: &[u8]) -> Result<Option<String>, DecodeError>;
}

/// Decoder backed by rxing's multi-format reader.
///
/// When several symbols are visible only the first one reported is used;
/// no attempt is made to pick the "right" barcode.
#[derive(Debug, Default, Clone, Copy)]
pub struct RxingDecoder;

impl BarcodeDecoder for RxingDecoder {
    fn decode(&self, image: &[u8]) -> Result<Option<String>, DecodeError> {
        let luma = load_image(image)?.to_luma8();
        let (width, height) = luma.dimensions();

        let results = match rxing::helpers::detect_multiple_in_luma(luma.into_raw(), width, height) {
            Ok(results) => results,
            Err(e) => {
                debug!("No barcode detected in the image: {:?}", e);
                return Ok(None);
            }
        };
        info!("Found {} barcode(s) in the image", results.len());

        let symbol = results
            .iter()
            .map(|r| r.getText().trim().to_string())
            .find(|text| !text.is_empty());

        if let Some(symbol) = &symbol {
            info!("Decoded barcode: {}", symbol);
        }
        Ok(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::imaging::tests::blank_png;

    #[test]
    fn blank_image_has_no_symbol() {
        assert_eq!(RxingDecoder.decode(&blank_png()).unwrap(), None);
    }

    #[test]
    fn corrupt_image_is_a_decode_error() {
        let err = RxingDecoder.decode(&[0xff, 0xd8, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable(_)));
    }
}
