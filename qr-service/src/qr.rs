//! QR encoding and PNG rasterization.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{types::QrError, EcLevel, QrCode, Version};

use crate::config::QrConfig;
use crate::error::EncodeError;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, Copy)]
pub struct QrSettings {
    /// Largest symbol version the encoder may pick.
    pub max_version: i16,
    pub ec_level: EcLevel,
    /// Pixels per module, both axes.
    pub box_size: u32,
    /// Surround the symbol with the standard 4-module light border.
    pub quiet_zone: bool,
}

impl From<&QrConfig> for QrSettings {
    fn from(config: &QrConfig) -> Self {
        Self {
            max_version: config.max_version,
            ec_level: config.error_correction.as_ec_level(),
            box_size: config.box_size,
            quiet_zone: config.quiet_zone,
        }
    }
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            max_version: 1,
            ec_level: EcLevel::L,
            box_size: 10,
            quiet_zone: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QrEncoder {
    settings: QrSettings,
}

impl QrEncoder {
    pub fn new(settings: QrSettings) -> Self {
        Self { settings }
    }

    /// Encode `data` with the smallest version that fits, up to the ceiling.
    pub fn encode(&self, data: &str) -> Result<QrCode, EncodeError> {
        for v in 1..=self.settings.max_version {
            match QrCode::with_version(data.as_bytes(), Version::Normal(v), self.settings.ec_level) {
                Ok(code) => return Ok(code),
                Err(QrError::DataTooLong) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(QrError::DataTooLong.into())
    }

    /// Black modules on white, `box_size` pixels each.
    pub fn rasterize(&self, code: &QrCode) -> GrayImage {
        code.render::<Luma<u8>>()
            .dark_color(DARK)
            .light_color(LIGHT)
            .quiet_zone(self.settings.quiet_zone)
            .module_dimensions(self.settings.box_size, self.settings.box_size)
            .build()
    }

    /// Full pipeline: payload to PNG bytes.
    pub fn encode_png(&self, data: &str) -> Result<Vec<u8>, EncodeError> {
        let code = self.encode(data)?;
        let img = self.rasterize(&code);

        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }
}
