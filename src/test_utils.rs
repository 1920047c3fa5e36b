pub mod test_helpers {
    use crate::pdf::{BBox, CompareError, PageSource, Raster, Token};

    /// Page background of [`MemoryDocument`] rasters
    pub const PAPER: [u8; 3] = [255, 255, 255];
    /// Color of word boxes drawn by [`MemoryDocument`]
    pub const INK: [u8; 3] = [0, 0, 0];

    const WORD_WIDTH: f32 = 30.0;
    const WORD_HEIGHT: f32 = 10.0;
    const WORD_GAP: f32 = 5.0;
    const MARGIN: f32 = 10.0;

    #[derive(Clone, Debug)]
    struct MemoryPage {
        width: f32,
        height: f32,
        tokens: Vec<Token>,
    }

    /// In-memory document for driving the comparison pipeline in tests.
    ///
    /// Words are laid out left to right on one line per page, each a fixed
    /// size box. Rendering paints those boxes in [`INK`] on [`PAPER`], so two
    /// documents with different words also differ in pixels.
    #[derive(Clone, Debug, Default)]
    pub struct MemoryDocument {
        pages: Vec<MemoryPage>,
        fail_extraction: bool,
        fail_render: bool,
    }

    impl MemoryDocument {
        pub fn new() -> Self {
            Self::default()
        }

        /// One page per entry, words split on whitespace
        pub fn from_pages(pages: &[&str]) -> Self {
            pages
                .iter()
                .fold(Self::new(), |doc, text| doc.with_page(text))
        }

        /// Append a 200x100 page holding `text`
        pub fn with_page(self, text: &str) -> Self {
            self.with_sized_page(200.0, 100.0, text)
        }

        pub fn with_sized_page(mut self, width: f32, height: f32, text: &str) -> Self {
            let page_index = self.pages.len();
            let tokens = text
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| Token::new(word, Self::word_box(i), page_index))
                .collect();
            self.pages.push(MemoryPage {
                width,
                height,
                tokens,
            });
            self
        }

        /// Append a token to the last page whose `page_index` may point anywhere
        pub fn with_stray_token(mut self, token: Token) -> Self {
            if let Some(page) = self.pages.last_mut() {
                page.tokens.push(token);
            }
            self
        }

        /// Make every `page_tokens` call fail
        pub fn failing_extraction(mut self) -> Self {
            self.fail_extraction = true;
            self
        }

        /// Make every `render_page` call fail
        pub fn failing_render(mut self) -> Self {
            self.fail_render = true;
            self
        }

        /// Box of the `i`-th word on a page, in page units
        pub fn word_box(i: usize) -> BBox {
            let x0 = MARGIN + i as f32 * (WORD_WIDTH + WORD_GAP);
            BBox::new(x0, MARGIN, x0 + WORD_WIDTH, MARGIN + WORD_HEIGHT)
        }

        fn page(&self, page: usize) -> Result<&MemoryPage, CompareError> {
            self.pages.get(page).ok_or(CompareError::PageOutOfRange {
                page,
                page_count: self.pages.len(),
            })
        }
    }

    impl PageSource for MemoryDocument {
        fn page_count(&self) -> Result<usize, CompareError> {
            Ok(self.pages.len())
        }

        fn page_tokens(&self, page: usize) -> Result<Vec<Token>, CompareError> {
            if self.fail_extraction {
                return Err(CompareError::generic("text layer unreadable"));
            }
            Ok(self.page(page)?.tokens.clone())
        }

        fn render_page(&self, page: usize, scale: f32) -> Result<Raster, CompareError> {
            if self.fail_render {
                return Err(CompareError::generic("renderer unavailable"));
            }
            let p = self.page(page)?;
            let width = (p.width * scale).round() as u32;
            let height = (p.height * scale).round() as u32;
            let mut raster = Raster::filled(width, height, page, PAPER);

            for token in p.tokens.iter().filter(|t| t.page_index == page) {
                let b = token.bbox.scaled(scale);
                let x1 = (b.x1.ceil() as u32).min(width);
                let y1 = (b.y1.ceil() as u32).min(height);
                for y in (b.y0.max(0.0) as u32)..y1 {
                    for x in (b.x0.max(0.0) as u32)..x1 {
                        raster.set_pixel(x, y, INK);
                    }
                }
            }
            Ok(raster)
        }
    }
}

pub use test_helpers::*;
