use crate::error::Result;
use image::{DynamicImage, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Compression quality used for icons sent to the host
pub const ICON_QUALITY: u8 = 90;

/// Raster format icons are compressed to before being sent to the host
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconFormat {
    #[default]
    Png,
    Jpeg,
}

impl IconFormat {
    /// Compress an icon into this format
    pub fn encode(self, icon: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());

        match self {
            Self::Png => icon.write_to(&mut buffer, ImageOutputFormat::Png)?,
            // JPEG has no alpha channel
            Self::Jpeg => DynamicImage::ImageRgb8(icon.to_rgb8()).write_to(
                &mut buffer,
                ImageOutputFormat::Jpeg(ICON_QUALITY),
            )?,
        }

        Ok(buffer.into_inner())
    }
}
