//! Pixel access abstraction used by the LSB codec.
//!
//! The codec only needs image dimensions and get/set access to a packed
//! pixel word. Words are `0xAARRGGBB`, so the least-significant bit of a
//! word is the least-significant bit of the blue channel.

/// Random access to packed pixel words.
pub trait PixelBuffer {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Packed `0xAARRGGBB` word at `(x, y)`.
    fn pixel_word(&self, x: u32, y: u32) -> u32;

    fn set_pixel_word(&mut self, x: u32, y: u32, word: u32);

    fn pixel_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

/// Plain in-memory ARGB buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgbBuffer {
    width: u32,
    height: u32,
    words: Vec<u32>,
}

impl ArgbBuffer {
    /// Create a buffer filled with `fill`.
    pub fn new(width: u32, height: u32, fill: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            words: vec![fill; len],
        }
    }

    /// Wrap existing words. Returns `None` if the length does not match.
    pub fn from_words(width: u32, height: u32, words: Vec<u32>) -> Option<Self> {
        (words.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            words,
        })
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl PixelBuffer for ArgbBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_word(&self, x: u32, y: u32) -> u32 {
        self.words[self.index(x, y)]
    }

    fn set_pixel_word(&mut self, x: u32, y: u32, word: u32) {
        let i = self.index(x, y);
        self.words[i] = word;
    }
}

#[cfg(feature = "image-io")]
impl PixelBuffer for image::RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel_word(&self, x: u32, y: u32) -> u32 {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        u32::from_be_bytes([a, r, g, b])
    }

    fn set_pixel_word(&mut self, x: u32, y: u32, word: u32) {
        let [a, r, g, b] = word.to_be_bytes();
        self.put_pixel(x, y, image::Rgba([r, g, b, a]));
    }
}
