use crate::models::device::SizePx;
use crate::processing::orientation::DisplayRotation;

/// The role an output target plays in a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// The host's display surface.
    Preview,
    /// The high-resolution still target.
    StillImage,
    /// The encoder's input while recording.
    EncoderInput,
}

/// One output target to bind into a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub kind: SurfaceKind,
    pub size: SizePx,
}

/// What the host reports about its render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
    pub rotation: DisplayRotation,
}

impl SurfaceInfo {
    pub fn size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }
}

/// The set of output targets currently bound to the open session.
///
/// At most one exists per controller; rebinding goes through the worker,
/// which drops the old set before asking the device to configure the new
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSurfaceSet {
    specs: Vec<SurfaceSpec>,
}

impl ActiveSurfaceSet {
    /// Preview set: display surface plus the still target, so captures
    /// need no reconfiguration.
    pub fn preview(preview: SizePx, still: SizePx) -> Self {
        Self {
            specs: vec![
                SurfaceSpec {
                    kind: SurfaceKind::Preview,
                    size: preview,
                },
                SurfaceSpec {
                    kind: SurfaceKind::StillImage,
                    size: still,
                },
            ],
        }
    }

    /// Recording set: display surface plus the encoder input. The still
    /// target is deliberately absent, which is what makes still capture
    /// and recording mutually exclusive at the hardware level.
    pub fn recording(preview: SizePx, encoder_input: SurfaceSpec) -> Self {
        Self {
            specs: vec![
                SurfaceSpec {
                    kind: SurfaceKind::Preview,
                    size: preview,
                },
                encoder_input,
            ],
        }
    }

    pub fn specs(&self) -> &[SurfaceSpec] {
        &self.specs
    }

    pub fn has_encoder_input(&self) -> bool {
        self.specs
            .iter()
            .any(|s| s.kind == SurfaceKind::EncoderInput)
    }
}
