#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bgr,
    Rgb,
}

/// A decoded frame as it comes out of a video source: 8-bit, three
/// interleaved channels, rows packed without padding.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn into_rgb(self) -> RgbFrame {
        let mut data = self.data;
        if self.format == PixelFormat::Bgr {
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
        }
        RgbFrame {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RgbFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbFrame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
