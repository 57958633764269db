//! Compiled shader objects

use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;

use super::api::SharedGraphicsApi;
use crate::outcome::{Error, Outcome};

crate::error_codes! {
    /// Failure codes of [`Shader::create`]
    pub enum ShaderErrorCode in "shader" {
        /// The driver returned no shader name
        FailedToCreateShader = 1 => "failed to create shader",
        /// The source did not compile; the message holds the info log
        FailedToCompileShader = 2 => "failed to compile shader",
    }
}

/// Pipeline stage a shader is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShaderKind {
    #[allow(missing_docs)]
    Vertex = 0x8B31,
    #[allow(missing_docs)]
    Fragment = 0x8B30,
    #[allow(missing_docs)]
    Geometry = 0x8DD9,
}

impl ShaderKind {
    /// Native enum value
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

/// A uniquely owned, successfully compiled shader
pub struct Shader {
    api: SharedGraphicsApi,
    id: Option<NonZeroU32>,
    kind: ShaderKind,
}

impl Shader {
    /// Create and compile a shader from source
    ///
    /// A failed compile logs the info log, deletes the shader object and
    /// returns [`ShaderErrorCode::FailedToCompileShader`] with the log as message.
    pub fn create(api: &SharedGraphicsApi, kind: ShaderKind, source: &str) -> Outcome<Self> {
        let Some(id) = NonZeroU32::new(api.create_shader(kind)) else {
            return Err(Error::new(ShaderErrorCode::FailedToCreateShader));
        };

        api.shader_source(id.get(), source);
        api.compile_shader(id.get());

        if !api.compile_status(id.get()) {
            let info_log = api.shader_info_log(id.get());
            if !info_log.is_empty() {
                log::error!("Failed to compile {kind:?} shader: {}", info_log.trim_end());
            }
            api.delete_shader(id.get());
            return Err(Error::with_message(
                ShaderErrorCode::FailedToCompileShader,
                info_log.trim_end(),
            ));
        }

        log::debug!("Created shader with id: {id}");

        Ok(Self {
            api: Rc::clone(api),
            id: Some(id),
            kind,
        })
    }

    /// Native shader name, 0 once released
    pub fn handle(&self) -> u32 {
        self.id.map_or(0, NonZeroU32::get)
    }

    /// Stage the shader was compiled for
    pub const fn kind(&self) -> ShaderKind {
        self.kind
    }

    /// Whether the shader no longer owns a name
    pub const fn is_released(&self) -> bool {
        self.id.is_none()
    }

    /// Delete the shader object; a no-op on a released shader
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.api.delete_shader(id.get());
            log::debug!("Deleted shader with id: {id}");
        }
    }

    /// Move ownership out, leaving `self` released
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            api: Rc::clone(&self.api),
            id: self.id.take(),
            kind: self.kind,
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("id", &self.id.map_or(0, NonZeroU32::get))
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::headless::{GraphicsCall, HeadlessGraphics};

    const VERTEX_SOURCE: &str = "#version 330 core\nlayout (location = 0) in vec2 position;\nvoid main() { gl_Position = vec4(position, 0.0, 1.0); }\n";

    fn setup() -> (Rc<HeadlessGraphics>, SharedGraphicsApi) {
        let headless = Rc::new(HeadlessGraphics::new());
        let api: SharedGraphicsApi = headless.clone();
        (headless, api)
    }

    #[test]
    fn test_create_compiles_source() {
        let (headless, api) = setup();

        let shader = Shader::create(&api, ShaderKind::Vertex, VERTEX_SOURCE).unwrap();

        assert_ne!(shader.handle(), 0);
        assert_eq!(shader.kind(), ShaderKind::Vertex);
        assert_eq!(headless.shader_source_of(shader.handle()).as_deref(), Some(VERTEX_SOURCE));
        assert_eq!(headless.live_shaders(), 1);
    }

    #[test]
    fn test_compile_failure_deletes_shader() {
        let (headless, api) = setup();

        let error = Shader::create(&api, ShaderKind::Fragment, "   ").unwrap_err();

        assert!(error.is(ShaderErrorCode::FailedToCompileShader));
        assert!(error.message().unwrap().contains("empty"));
        assert_eq!(headless.live_shaders(), 0);
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::DeleteShader(_))), 1);
    }

    #[test]
    fn test_scripted_compile_failure() {
        let (headless, api) = setup();
        headless.fail_compilation(true);

        let error = Shader::create(&api, ShaderKind::Geometry, VERTEX_SOURCE).unwrap_err();

        assert_eq!(error.code::<ShaderErrorCode>(), Some(ShaderErrorCode::FailedToCompileShader));
        assert_eq!(headless.live_shaders(), 0);
    }

    #[test]
    fn test_creation_failure_has_no_side_effects() {
        let (headless, api) = setup();
        headless.fail_shader_creation(true);

        let error = Shader::create(&api, ShaderKind::Vertex, VERTEX_SOURCE).unwrap_err();

        assert!(error.is(ShaderErrorCode::FailedToCreateShader));
        assert!(!error.has_message());
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::ShaderSource { .. })), 0);
    }

    #[test]
    fn test_release_and_take() {
        let (headless, api) = setup();
        let mut shader = Shader::create(&api, ShaderKind::Vertex, VERTEX_SOURCE).unwrap();
        let original = shader.handle();

        let mut moved = shader.take();
        assert!(shader.is_released());
        assert_eq!(moved.handle(), original);

        moved.release();
        moved.release();
        shader.release();
        assert_eq!(headless.count(|c| matches!(c, GraphicsCall::DeleteShader(_))), 1);
    }

    #[test]
    fn test_handle_after_release_is_zero() {
        let (_headless, api) = setup();
        let mut shader = Shader::create(&api, ShaderKind::Vertex, VERTEX_SOURCE).unwrap();
        shader.release();

        assert!(shader.is_released());
        assert_eq!(shader.handle(), 0);
        assert_eq!(shader.take().handle(), 0);
    }
}
