// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A pixel surface of premultiplied ARGB values.

use plume_common::color::{Color, ColorExt};

use crate::SurfaceError;

/// A surface of 32-bit premultiplied `0xAARRGGBB` pixels, origin top-left and y pointing down.
///
/// Rows are `stride` pixels apart, which may exceed the width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u32>,
}

impl Surface {
    /// Create a surface with all pixels transparent black.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            stride: width as usize,
            data: vec![0; len],
        })
    }

    /// Wrap existing premultiplied ARGB pixels with a row stride in pixels.
    pub fn from_data(
        data: Vec<u32>,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, SurfaceError> {
        checked_len(width, height)?;
        if stride < width as usize {
            return Err(SurfaceError::StrideTooSmall { stride, width });
        }
        let required = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(width as usize))
            .ok_or(SurfaceError::InvalidSize { width, height })?;
        if data.len() < required {
            return Err(SurfaceError::BufferTooSmall {
                len: data.len(),
                required,
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Distance between rows, in pixels.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The raw pixel storage, including any padding after each row.
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// The raw pixel storage, mutably.
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// The raw pixel storage as native-endian bytes.
    pub fn data_as_u8_slice(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// One row of pixels, without padding.
    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize]
    }

    /// One row of pixels, mutably.
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.width as usize]
    }

    /// The pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height)
            .then(|| self.data[y as usize * self.stride + x as usize])
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Color) {
        let value = color.to_premul_argb32();
        for y in 0..self.height {
            self.row_mut(y).fill(value);
        }
    }

    /// Convert to tightly packed, unpremultiplied RGBA bytes.
    pub fn to_rgba8_unpremultiplied(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            out.extend(self.row(y).iter().flat_map(|&p| argb_to_rgba(p)));
        }
        out
    }

    /// Build a surface from tightly packed, unpremultiplied RGBA bytes.
    pub fn from_rgba8_unpremultiplied(
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Self, SurfaceError> {
        let mut surface = Self::new(width, height)?;
        let required = surface.data.len() * 4;
        if rgba.len() < required {
            return Err(SurfaceError::BufferTooSmall {
                len: rgba.len() / 4,
                required: surface.data.len(),
            });
        }
        for (dst, src) in surface.data.iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = rgba_to_argb([src[0], src[1], src[2], src[3]]);
        }
        Ok(surface)
    }

    /// Decode a PNG image.
    #[cfg(feature = "png")]
    pub fn from_png(data: impl std::io::Read) -> Result<Self, SurfaceError> {
        let mut decoder = png::Decoder::new(data);
        decoder.set_transformations(
            png::Transformations::normalize_to_color8() | png::Transformations::ALPHA,
        );
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let samples = info.color_type.samples();
        let mut surface = Self::new(info.width, info.height)?;
        for y in 0..info.height {
            let line = &buf[y as usize * info.line_size..][..info.width as usize * samples];
            for (dst, px) in surface.row_mut(y).iter_mut().zip(line.chunks_exact(samples)) {
                let rgba = match *px {
                    [g] => [g, g, g, 255],
                    [g, a] => [g, g, g, a],
                    [r, g, b] => [r, g, b, 255],
                    [r, g, b, a] => [r, g, b, a],
                    _ => [0; 4],
                };
                *dst = rgba_to_argb(rgba);
            }
        }
        Ok(surface)
    }

    /// Encode as an 8-bit RGBA PNG.
    #[cfg(feature = "png")]
    pub fn write_to_png(&self, writer: impl std::io::Write) -> Result<(), SurfaceError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.to_rgba8_unpremultiplied())?;
        writer.finish()?;
        Ok(())
    }

    /// Encode as a PNG file at `path`.
    #[cfg(feature = "png")]
    pub fn write_to_png_path(&self, path: impl AsRef<std::path::Path>) -> Result<(), SurfaceError> {
        let file = std::fs::File::create(path)?;
        self.write_to_png(std::io::BufWriter::new(file))
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize, SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::InvalidSize { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&n| n <= isize::MAX as usize / 4)
        .ok_or(SurfaceError::InvalidSize { width, height })
}

/// Convert a premultiplied `0xAARRGGBB` pixel to unpremultiplied `[r, g, b, a]`.
pub fn argb_to_rgba(pixel: u32) -> [u8; 4] {
    let [a, r, g, b] = pixel.to_be_bytes();
    if a == 0 {
        return [0; 4];
    }
    let unpremultiply = |c: u8| (u32::from(c) * 255 / u32::from(a)).min(255) as u8;
    [unpremultiply(r), unpremultiply(g), unpremultiply(b), a]
}

/// Convert unpremultiplied `[r, g, b, a]` to a premultiplied `0xAARRGGBB` pixel.
pub fn rgba_to_argb([r, g, b, a]: [u8; 4]) -> u32 {
    let premultiply = |c: u8| (u32::from(c) * u32::from(a) / 255) as u8;
    u32::from_be_bytes([a, premultiply(r), premultiply(g), premultiply(b)])
}

/// Convert rows of premultiplied ARGB pixels into unpremultiplied RGBA bytes in place.
///
/// The buffer is interpreted as native-endian `u32` values and rewritten as bytes in RGBA order.
pub fn convert_argb_to_rgba(pixels: &mut [u32]) {
    for p in pixels {
        *p = u32::from_ne_bytes(argb_to_rgba(*p));
    }
}

/// The inverse of [`convert_argb_to_rgba`].
pub fn convert_rgba_to_argb(pixels: &mut [u32]) {
    for p in pixels {
        *p = rgba_to_argb(p.to_ne_bytes());
    }
}
