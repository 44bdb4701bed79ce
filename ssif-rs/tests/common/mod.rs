#![allow(dead_code)]

use flate2::{write::ZlibEncoder, Compression};
use ndarray::Array2;
use ssif_rs::PackingOrder;
use std::io::Write;

/// Writes SSIF files for tests.
///
/// Planes are emitted by a nested loop over the axes named by the packing order, innermost
/// axis first in the name, independently of the reader's index arithmetic.
#[derive(Debug, Clone)]
pub struct SsifBuilder {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub timepoints: u32,
    pub channels: u32,
    pub bytes_per_pixel: u32,
    pub packing_order: PackingOrder,
    pub channel_names: Vec<String>,
    /// When set, every pixel holds this value.
    pub fill: Option<u32>,
}

impl SsifBuilder {
    pub fn new(packing_order: PackingOrder) -> Self {
        SsifBuilder {
            name: "test stack".to_string(),
            width: 3,
            height: 4,
            depth: 2,
            timepoints: 3,
            channels: 2,
            bytes_per_pixel: 2,
            packing_order,
            channel_names: vec!["red".to_string(), "green".to_string()],
            fill: None,
        }
    }

    pub fn bytes_per_pixel(mut self, bytes_per_pixel: u32) -> Self {
        self.bytes_per_pixel = bytes_per_pixel;
        self
    }

    pub fn fill(mut self, value: u32) -> Self {
        self.fill = Some(value);
        self
    }

    fn mask(&self) -> u64 {
        (1u64 << (8 * self.bytes_per_pixel)) - 1
    }

    /// Value of pixel `(i, j)` of plane `(z, t, c)`.
    pub fn pixel(&self, z: usize, t: usize, c: usize, i: usize, j: usize) -> u32 {
        if let Some(value) = self.fill {
            return value;
        }
        let coordinate = ((z * 7 + t) * 5 + c) as u64;
        let position = (i * self.height as usize + j) as u64;
        let value = coordinate * 31 + position + coordinate * 65_537 * (self.bytes_per_pixel as u64 / 4);
        (value & self.mask()) as u32
    }

    /// The plane `(z, t, c)` as the reader should return it.
    pub fn expected_plane(&self, z: usize, t: usize, c: usize) -> Array2<u32> {
        Array2::from_shape_fn((self.width as usize, self.height as usize), |(i, j)| {
            self.pixel(z, t, c, i, j)
        })
    }

    /// Uncompressed bytes of plane `(z, t, c)`.
    pub fn raw_plane(&self, z: usize, t: usize, c: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        for i in 0..self.width as usize {
            for j in 0..self.height as usize {
                let le = self.pixel(z, t, c, i, j).to_le_bytes();
                bytes.extend_from_slice(&le[..self.bytes_per_pixel as usize]);
            }
        }
        bytes
    }

    /// Logical coordinates in file-write order.
    pub fn write_order(&self) -> Vec<(usize, usize, usize)> {
        let size = |axis: char| match axis {
            'Z' => self.depth as usize,
            'T' => self.timepoints as usize,
            _ => self.channels as usize,
        };
        let axes: Vec<char> = self.packing_order.to_string().chars().rev().collect();
        let (outer, middle, inner) = (axes[0], axes[1], axes[2]);

        let mut order = Vec::new();
        for a in 0..size(outer) {
            for b in 0..size(middle) {
                for d in 0..size(inner) {
                    let mut ztc = [0usize; 3];
                    for (axis, value) in [(outer, a), (middle, b), (inner, d)] {
                        let slot = match axis {
                            'Z' => 0,
                            'T' => 1,
                            _ => 2,
                        };
                        ztc[slot] = value;
                    }
                    order.push((ztc[0], ztc[1], ztc[2]));
                }
            }
        }
        order
    }

    /// Compressed payloads in file-write order.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.write_order()
            .into_iter()
            .map(|(z, t, c)| compress(&self.raw_plane(z, t, c)))
            .collect()
    }

    /// Header and channel name table.
    pub fn preamble(&self) -> Vec<u8> {
        let mut bytes = fixed_record(&self.name, 64);
        for field in [
            self.width,
            self.height,
            self.depth,
            self.timepoints,
            self.channels,
            self.bytes_per_pixel,
            self.packing_order.index(),
        ] {
            bytes.extend_from_slice(&field.to_le_bytes());
        }
        for name in &self.channel_names {
            bytes.extend_from_slice(&fixed_record(name, 32));
        }
        bytes
    }

    /// A complete file with the given payloads.
    pub fn assemble(&self, payloads: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = self.preamble();
        for payload in payloads {
            bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(payload);
        }
        bytes
    }

    pub fn build(&self) -> Vec<u8> {
        self.assemble(&self.payloads())
    }
}

pub fn compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn fixed_record(text: &str, width: usize) -> Vec<u8> {
    let mut record = vec![0u8; width];
    record[..text.len()].copy_from_slice(text.as_bytes());
    record
}
