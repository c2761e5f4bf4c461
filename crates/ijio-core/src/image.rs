//! Images and stacks
//!
//! An [`Image`] is a titled [`ImageStack`] of one or more processors of the
//! same kind and size, together with its [`Calibration`] and hyperstack
//! layout. A single-plane image is a stack of length one.

use crate::calibration::Calibration;
use crate::error::{Error, Result};
use crate::processor::{Processor, ProcessorKind};

/// Ordered slices of equal size and kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStack {
    width: u32,
    height: u32,
    slices: Vec<Processor>,
    labels: Vec<Option<String>>,
}

impl ImageStack {
    /// Create an empty stack for planes of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            slices: Vec::new(),
            labels: Vec::new(),
        })
    }

    /// Build a stack from processors.
    pub fn from_processors(slices: Vec<Processor>) -> Result<Self> {
        let first = slices
            .first()
            .ok_or_else(|| Error::InvalidParameter("stack needs at least one slice".to_string()))?;
        let mut stack = Self::new(first.width(), first.height())?;
        for p in slices {
            stack.push(p, None)?;
        }
        Ok(stack)
    }

    /// Append a slice.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] when the size differs from the stack's
    /// - [`Error::Consistency`] when the kind differs from the first slice's
    pub fn push(&mut self, processor: Processor, label: Option<String>) -> Result<()> {
        if processor.width() != self.width || processor.height() != self.height {
            return Err(Error::InvalidDimension {
                width: processor.width(),
                height: processor.height(),
            });
        }
        if let Some(kind) = self.kind()
            && kind != processor.kind()
        {
            return Err(Error::Consistency(format!(
                "cannot add a {} slice to a {} stack",
                processor.kind().name(),
                kind.name()
            )));
        }
        self.slices.push(processor);
        self.labels.push(label);
        Ok(())
    }

    /// Width of every slice
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of every slice
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of slices
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Kind of the slices, `None` for an empty stack.
    pub fn kind(&self) -> Option<ProcessorKind> {
        self.slices.first().map(Processor::kind)
    }

    /// Slice `index` (0-based).
    pub fn processor(&self, index: usize) -> Option<&Processor> {
        self.slices.get(index)
    }

    /// Slice `index` (0-based), mutably.
    pub fn processor_mut(&mut self, index: usize) -> Option<&mut Processor> {
        self.slices.get_mut(index)
    }

    /// Label of slice `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index)?.as_deref()
    }

    /// All slices
    pub fn processors(&self) -> &[Processor] {
        &self.slices
    }

    /// Give up the stack and keep its slices.
    pub fn into_processors(self) -> Vec<Processor> {
        self.slices
    }
}

/// How a multi-channel image displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    /// Channels blended into one color view
    Composite,
    /// One channel at a time in its own color
    Color,
    /// One channel at a time in gray
    Grayscale,
}

impl ChannelMode {
    /// Name used in TIFF descriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelMode::Composite => "composite",
            ChannelMode::Color => "color",
            ChannelMode::Grayscale => "grayscale",
        }
    }

    /// Parse a description `mode=` value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composite" => Some(ChannelMode::Composite),
            "color" => Some(ChannelMode::Color),
            "grayscale" | "gray" => Some(ChannelMode::Grayscale),
            _ => None,
        }
    }
}

/// A titled stack with calibration and hyperstack layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    title: String,
    stack: ImageStack,
    current: usize,
    calibration: Calibration,
    channels: usize,
    slices: usize,
    frames: usize,
    mode: Option<ChannelMode>,
    info: Option<String>,
}

impl Image {
    /// Single-plane image.
    pub fn from_processor(title: impl Into<String>, processor: Processor) -> Self {
        let stack = ImageStack {
            width: processor.width(),
            height: processor.height(),
            slices: vec![processor],
            labels: vec![None],
        };
        Self::with_stack(title.into(), stack)
    }

    /// Image over a non-empty stack; every slice counts as a z-slice.
    pub fn from_stack(title: impl Into<String>, stack: ImageStack) -> Result<Self> {
        if stack.is_empty() {
            return Err(Error::InvalidParameter("image stack is empty".to_string()));
        }
        Ok(Self::with_stack(title.into(), stack))
    }

    fn with_stack(title: String, stack: ImageStack) -> Self {
        let slices = stack.len();
        Self {
            title,
            stack,
            current: 0,
            calibration: Calibration::default(),
            channels: 1,
            slices,
            frames: 1,
            mode: None,
            info: None,
        }
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rename.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.stack.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.stack.height()
    }

    /// Kind shared by every slice
    pub fn kind(&self) -> ProcessorKind {
        self.processor().kind()
    }

    /// Number of slices in the stack
    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    /// The stack
    pub fn stack(&self) -> &ImageStack {
        &self.stack
    }

    /// The stack, mutably
    pub fn stack_mut(&mut self) -> &mut ImageStack {
        &mut self.stack
    }

    /// Give up the image and keep its stack.
    pub fn into_stack(self) -> ImageStack {
        self.stack
    }

    /// Processor of the current slice.
    pub fn processor(&self) -> &Processor {
        &self.stack.slices[self.current]
    }

    /// Processor of the current slice, mutably.
    pub fn processor_mut(&mut self) -> &mut Processor {
        &mut self.stack.slices[self.current]
    }

    /// Current slice (0-based).
    pub fn current_slice(&self) -> usize {
        self.current
    }

    /// Make slice `index` (0-based) current.
    pub fn set_slice(&mut self, index: usize) -> Result<()> {
        if index >= self.stack.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.stack.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// `(channels, slices, frames)`
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.channels, self.slices, self.frames)
    }

    /// Set the hyperstack layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Consistency`] unless the product equals the stack size.
    pub fn set_dimensions(&mut self, channels: usize, slices: usize, frames: usize) -> Result<()> {
        if channels * slices * frames != self.stack.len() {
            return Err(Error::Consistency(format!(
                "{channels}x{slices}x{frames} does not match a stack of {}",
                self.stack.len()
            )));
        }
        self.channels = channels;
        self.slices = slices;
        self.frames = frames;
        Ok(())
    }

    /// Check if the layout has more than one non-trivial dimension or channels.
    pub fn is_hyperstack(&self) -> bool {
        let used = [self.channels, self.slices, self.frames]
            .iter()
            .filter(|&&d| d > 1)
            .count();
        used > 1 || (self.channels > 1 && self.mode.is_some())
    }

    /// Channel display mode, if this is a multi-channel image.
    pub fn mode(&self) -> Option<ChannelMode> {
        self.mode
    }

    /// Set the channel display mode.
    pub fn set_mode(&mut self, mode: Option<ChannelMode>) {
        self.mode = mode;
    }

    /// Check if channels display blended.
    pub fn is_composite(&self) -> bool {
        self.channels > 1 && self.mode == Some(ChannelMode::Composite)
    }

    /// Calibration
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Calibration, mutably
    pub fn calibration_mut(&mut self) -> &mut Calibration {
        &mut self.calibration
    }

    /// Replace the calibration.
    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
    }

    /// Free-text info
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Set free-text info.
    pub fn set_info(&mut self, info: Option<String>) {
        self.info = info;
    }
}
