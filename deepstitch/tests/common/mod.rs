//! Shared fixtures for integration tests.

#![allow(dead_code)]

use deepstitch::provider::{AsyncHttpClient, ProviderError};
use deepstitch::TileSource;
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory tile server.
///
/// Known URLs answer with their body, unknown URLs with 404. An optional
/// delay is applied to every GET.
#[derive(Default)]
pub struct TileServer {
    resources: HashMap<String, Vec<u8>>,
    delay: Option<Duration>,
    gets: AtomicUsize,
    heads: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl TileServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, body: Vec<u8>) {
        self.resources.insert(url.into(), body);
    }

    pub fn remove(&mut self, url: &str) {
        self.resources.remove(url);
    }

    /// Adds a `rows × cols` level of solid `size × size` tiles.
    pub fn add_level(&mut self, source: &TileSource, scale: u32, rows: u32, cols: u32, size: u32) {
        for row in 0..rows {
            for col in 0..cols {
                self.insert(
                    source.tile_url(scale, row, col),
                    png_tile(size, size, color(row, col)),
                );
            }
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn heads(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    /// URLs requested with GET, in request order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.resources
            .get(url)
            .cloned()
            .ok_or_else(|| ProviderError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

impl AsyncHttpClient for TileServer {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.lookup(url)
    }

    async fn head(&self, url: &str) -> Result<(), ProviderError> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        self.lookup(url).map(|_| ())
    }
}

/// Colour of tile `(row, col)` in generated levels.
pub fn color(row: u32, col: u32) -> [u8; 3] {
    [(30 + (row % 4) * 60) as u8, (30 + (col % 4) * 60) as u8, 160]
}

pub fn png_tile(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut buffer = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )
    .unwrap();
    buffer
}

/// Asserts a decoded JPEG pixel is close to `expected`.
pub fn assert_close(image: &RgbImage, x: u32, y: u32, expected: [u8; 3]) {
    let actual = image.get_pixel(x, y).0;
    for channel in 0..3 {
        let diff = (actual[channel] as i16 - expected[channel] as i16).abs();
        assert!(
            diff <= 12,
            "pixel ({}, {}) is {:?}, expected about {:?}",
            x,
            y,
            actual,
            expected
        );
    }
}
