//! Resolution of the read framebuffer's color attachment size.
//!
//! Walks context -> read framebuffer -> color attachment 0 -> texture level
//! (or cube face, or renderbuffer). Every hop may miss; a miss means the
//! attachment is incomplete and the caller should skip the capture.

use serde::{Deserialize, Serialize};

use crate::state::{Attachment, ContextLookup, TextureKind, ThreadId};

/// Pixel dimensions of a framebuffer attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSize {
    pub width: u32,
    pub height: u32,
}

impl AttachmentSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Size of the image bound at `attachment`, if it has one.
///
/// Texture attachments of a target other than 2D or cube map resolve to
/// `None`.
pub fn resolve_attachment_size(attachment: &Attachment) -> Option<AttachmentSize> {
    match attachment {
        Attachment::Texture {
            texture,
            level,
            cube_map_face,
        } => match &texture.kind {
            TextureKind::Texture2D { levels } => {
                let image = levels.get(level)?;
                Some(AttachmentSize::new(image.width, image.height))
            }
            TextureKind::CubeMap { levels } => {
                let image = levels.get(level)?.faces.get(cube_map_face)?;
                Some(AttachmentSize::new(image.width, image.height))
            }
            TextureKind::Other { .. } => None,
        },
        Attachment::Renderbuffer { renderbuffer } => Some(AttachmentSize::new(
            renderbuffer.width,
            renderbuffer.height,
        )),
        Attachment::None => None,
    }
}

/// Size of color attachment 0 of the read framebuffer bound on `thread`.
///
/// Only attachment point 0 is inspected; that is the surface `glReadPixels`
/// reads from by default.
pub fn resolve_color_attachment0_size<L>(lookup: &L, thread: ThreadId) -> Option<AttachmentSize>
where
    L: ContextLookup + ?Sized,
{
    let context = lookup.context(thread)?;
    let framebuffer = context.read_framebuffer()?;
    let attachment = framebuffer.color_attachment(0)?;
    resolve_attachment_size(attachment)
}
