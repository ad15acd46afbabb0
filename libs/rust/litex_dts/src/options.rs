/// Geometry of a linear framebuffer in 32-bit `a8b8g8r8` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framebuffer {
    base: u64,
    width: u32,
    height: u32,
}

impl Framebuffer {
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// Geometry used when the caller does not provide one. It matches the
    /// 720p framebuffer of the reference boards only.
    #[deprecated(note = "pass the framebuffer geometry in `Options::framebuffer`")]
    pub const FALLBACK: Framebuffer = Framebuffer {
        base: 0xc800_0000,
        width: 1280,
        height: 720,
    };

    /// Returns `None` if a dimension is zero or the stride or size do not
    /// fit in 32 bits.
    pub fn new(base: u64, width: u32, height: u32) -> Option<Framebuffer> {
        if width == 0 || height == 0 {
            return None;
        }

        let stride = width.checked_mul(Self::BYTES_PER_PIXEL)?;
        let size = stride.checked_mul(height)?;
        base.checked_add(u64::from(size))?;
        Some(Framebuffer {
            base,
            width,
            height,
        })
    }

    pub const fn base(&self) -> u64 {
        self.base
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per line.
    pub const fn stride(&self) -> u32 {
        self.width * Self::BYTES_PER_PIXEL
    }

    pub const fn size(&self) -> u64 {
        self.stride() as u64 * self.height as u64
    }
}

/// Knobs that are not part of the SoC descriptor.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Framebuffer geometry. When `None` and the SoC has a framebuffer,
    /// [`Framebuffer::FALLBACK`] is used and a warning is logged.
    pub framebuffer: Option<Framebuffer>,
    /// Fold `&label { ... };` patch blocks into the nodes they amend instead
    /// of rendering them after the root node.
    pub inline_patches: bool,
}
