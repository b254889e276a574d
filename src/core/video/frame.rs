use image::GrayImage;

use crate::core::config::CropRegion;

/// 解码后的帧数据（RGB24 紧凑排列）
#[derive(Debug, Clone)]
pub struct RgbFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub frame_number: u64,
    pub timestamp_ms: u64,
}

impl RgbFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, frame_number: u64, timestamp_ms: u64) -> Self {
        Self {
            width,
            height,
            data,
            frame_number,
            timestamp_ms,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// 转灰度，整数权重 299/587/114
    pub fn to_gray(&self) -> GrayFrame {
        let data: Vec<u8> = self
            .data
            .chunks_exact(3)
            .map(|rgb| {
                ((rgb[0] as u32 * 299 + rgb[1] as u32 * 587 + rgb[2] as u32 * 114) / 1000) as u8
            })
            .collect();

        GrayFrame {
            width: self.width,
            height: self.height,
            data,
            frame_number: self.frame_number,
            timestamp_ms: self.timestamp_ms,
        }
    }
}

/// 灰度帧（8-bit 亮度）
#[derive(Debug, Clone)]
pub struct GrayFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub frame_number: u64,
    pub timestamp_ms: u64,
}

impl GrayFrame {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// 数据长度与声明尺寸一致
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize)
    }

    fn empty_like(&self) -> GrayFrame {
        GrayFrame {
            width: 0,
            height: 0,
            data: Vec::new(),
            frame_number: self.frame_number,
            timestamp_ms: self.timestamp_ms,
        }
    }

    /// 裁剪到感兴趣区域，超出部分按帧边界截断；数据不完整时返回空帧
    pub fn crop(&self, region: &CropRegion) -> GrayFrame {
        if !self.is_well_formed() {
            return self.empty_like();
        }

        let x = region.x.min(self.width);
        let y = region.y.min(self.height);
        let w = region.width.min(self.width - x);
        let h = region.height.min(self.height - y);

        let mut data = Vec::with_capacity((w * h) as usize);
        for row in y..y + h {
            let start = (row * self.width + x) as usize;
            data.extend_from_slice(&self.data[start..start + w as usize]);
        }

        GrayFrame {
            width: w,
            height: h,
            data,
            frame_number: self.frame_number,
            timestamp_ms: self.timestamp_ms,
        }
    }

    pub fn to_image(&self) -> Option<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.data.clone())
    }
}
