//! Mirror of the driver's per-thread context state.
//!
//! The interception layer keeps this graph in sync with the application's
//! calls (context creation, framebuffer binding, texture uploads). The
//! extractors in this crate only read it, through the [`ContextLookup`]
//! capability.
//!
//! Objects are shared through `Arc` the same way the driver shares them: a
//! texture attached to a framebuffer is the same object as the one in the
//! context's texture table.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of an application thread issuing GL calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId(pub u64);

/// Driver-assigned framebuffer name. 0 is the default framebuffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramebufferId(pub u32);

/// Driver-assigned texture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Driver-assigned renderbuffer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderbufferId(pub u32);

/// Dimensions of one uploaded image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureLevel {
    pub width: u32,
    pub height: u32,
}

impl TextureLevel {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The six faces of one cube map mip level, keyed by face index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeMapLevel {
    pub faces: BTreeMap<u32, TextureLevel>,
}

/// Texture target plus the images uploaded so far.
///
/// A level or face that was never uploaded is simply absent from its map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureKind {
    #[serde(rename = "texture_2d")]
    Texture2D { levels: BTreeMap<u32, TextureLevel> },
    CubeMap { levels: BTreeMap<u32, CubeMapLevel> },
    /// Any target the resolver does not inspect (3D, arrays, external).
    Other { target: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
    pub kind: TextureKind,
}

impl Texture {
    /// An empty `GL_TEXTURE_2D`.
    pub fn texture_2d() -> Self {
        Self {
            kind: TextureKind::Texture2D {
                levels: BTreeMap::new(),
            },
        }
    }

    /// An empty `GL_TEXTURE_CUBE_MAP`.
    pub fn cube_map() -> Self {
        Self {
            kind: TextureKind::CubeMap {
                levels: BTreeMap::new(),
            },
        }
    }

    /// A texture of some other target.
    pub fn other(target: u32) -> Self {
        Self {
            kind: TextureKind::Other { target },
        }
    }

    /// Records a 2D upload at `level`. No-op for other kinds.
    pub fn with_level(mut self, level: u32, image: TextureLevel) -> Self {
        if let TextureKind::Texture2D { levels } = &mut self.kind {
            levels.insert(level, image);
        }
        self
    }

    /// Records a cube map face upload. No-op for other kinds.
    pub fn with_face(mut self, level: u32, face: u32, image: TextureLevel) -> Self {
        if let TextureKind::CubeMap { levels } = &mut self.kind {
            levels.entry(level).or_default().faces.insert(face, image);
        }
        self
    }

    /// GL target enum for this texture.
    pub fn target(&self) -> u32 {
        match self.kind {
            TextureKind::Texture2D { .. } => glow::TEXTURE_2D,
            TextureKind::CubeMap { .. } => glow::TEXTURE_CUBE_MAP,
            TextureKind::Other { target } => target,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderbuffer {
    pub width: u32,
    pub height: u32,
}

impl Renderbuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// What is bound at a framebuffer attachment point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attachment {
    Texture {
        texture: Arc<Texture>,
        level: u32,
        /// Face index, only meaningful for cube maps.
        #[serde(default)]
        cube_map_face: u32,
    },
    Renderbuffer {
        renderbuffer: Arc<Renderbuffer>,
    },
    #[default]
    None,
}

/// Color attachments keyed by attachment point index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framebuffer {
    pub color_attachments: BTreeMap<u32, Attachment>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `attachment` at color attachment point `index`.
    pub fn with_color_attachment(mut self, index: u32, attachment: Attachment) -> Self {
        self.color_attachments.insert(index, attachment);
        self
    }

    pub fn color_attachment(&self, index: u32) -> Option<&Attachment> {
        self.color_attachments.get(&index)
    }
}

/// Object tables of one context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objects {
    #[serde(default)]
    pub framebuffers: HashMap<FramebufferId, Arc<Framebuffer>>,
    #[serde(default)]
    pub textures: HashMap<TextureId, Arc<Texture>>,
    #[serde(default)]
    pub renderbuffers: HashMap<RenderbufferId, Arc<Renderbuffer>>,
}

/// One driver context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub bound_read_framebuffer: FramebufferId,
    pub objects: Objects,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `framebuffer` to the object table under `id`.
    pub fn insert_framebuffer(&mut self, id: FramebufferId, framebuffer: Framebuffer) {
        self.objects.framebuffers.insert(id, Arc::new(framebuffer));
    }

    /// Adds `texture` under `id`, returning the shared handle for attaching.
    pub fn insert_texture(&mut self, id: TextureId, texture: Texture) -> Arc<Texture> {
        let texture = Arc::new(texture);
        self.objects.textures.insert(id, Arc::clone(&texture));
        texture
    }

    /// Adds `renderbuffer` under `id`, returning the shared handle.
    pub fn insert_renderbuffer(
        &mut self,
        id: RenderbufferId,
        renderbuffer: Renderbuffer,
    ) -> Arc<Renderbuffer> {
        let renderbuffer = Arc::new(renderbuffer);
        self.objects
            .renderbuffers
            .insert(id, Arc::clone(&renderbuffer));
        renderbuffer
    }

    pub fn bind_read_framebuffer(&mut self, id: FramebufferId) {
        self.bound_read_framebuffer = id;
    }

    /// The framebuffer currently bound for reading, if it exists.
    pub fn read_framebuffer(&self) -> Option<&Framebuffer> {
        self.objects
            .framebuffers
            .get(&self.bound_read_framebuffer)
            .map(Arc::as_ref)
    }
}

/// Read access to the context bound on a thread.
pub trait ContextLookup {
    fn context(&self, thread: ThreadId) -> Option<&Context>;
}

/// Process-wide map from thread to its current context.
///
/// Contains no locking: the interception layer serializes mutation against
/// extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStateGraph {
    contexts: BTreeMap<ThreadId, Arc<Context>>,
}

impl ContextStateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `context` current on `thread`, replacing any previous binding.
    pub fn bind(&mut self, thread: ThreadId, context: Context) -> Arc<Context> {
        let context = Arc::new(context);
        self.contexts.insert(thread, Arc::clone(&context));
        context
    }

    /// Makes an already shared context current on `thread`.
    pub fn bind_shared(&mut self, thread: ThreadId, context: Arc<Context>) {
        self.contexts.insert(thread, context);
    }

    pub fn unbind(&mut self, thread: ThreadId) -> Option<Arc<Context>> {
        self.contexts.remove(&thread)
    }

    /// Threads with a bound context, in ascending order.
    pub fn threads(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.contexts.keys().copied()
    }

    /// Decodes a graph snapshot from JSON.
    pub fn from_json(text: &str) -> Result<Self, crate::error::ExtrasError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encodes the graph as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, crate::error::ExtrasError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ContextLookup for ContextStateGraph {
    fn context(&self, thread: ThreadId) -> Option<&Context> {
        self.contexts.get(&thread).map(Arc::as_ref)
    }
}
