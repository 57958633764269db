//! Forge demo application
//!
//! Opens a window, uploads a triangle and presents frames until the window is
//! closed. `--headless` runs the same code without a display.
//!
//! The vertex and fragment shaders are only compiled, which checks the
//! driver accepts them. nexus has no program object, so nothing is drawn
//! and each frame is just a clear.

use std::path::PathBuf;
use std::process::ExitCode;

use nexus::prelude::*;
use nexus::sys::WindowPlatform;

const USAGE: &str = "usage: forge [--config <path>] [--headless] [--frames <n>]";

/// Frames rendered by a headless run without `--frames`
const DEFAULT_HEADLESS_FRAMES: u32 = 60;

const VERTEX_SHADER: &str = r"#version 330 core
layout (location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

const FRAGMENT_SHADER: &str = r"#version 330 core
out vec4 color;

void main() {
    color = vec4(0.9, 0.5, 0.2, 1.0);
}
";

const TRIANGLE: [f32; 6] = [0.0, 0.5, -0.5, -0.5, 0.5, -0.5];

/// Application errors
#[derive(thiserror::Error, Debug)]
enum ForgeError {
    /// Bad command line
    #[error("{0}\n{USAGE}")]
    Usage(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A subsystem or resource failed to start
    #[error("{context}: {source}")]
    Startup {
        context: &'static str,
        source: Error,
    },
}

impl ForgeError {
    fn startup(context: &'static str) -> impl FnOnce(Error) -> Self {
        move |source| Self::Startup { context, source }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    headless: bool,
    frames: Option<u32>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ForgeError> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| ForgeError::Usage("--config needs a path".to_string()))?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--headless" => parsed.headless = true,
                "--frames" => {
                    let count = args
                        .next()
                        .ok_or_else(|| ForgeError::Usage("--frames needs a count".to_string()))?;
                    let count = count
                        .parse()
                        .map_err(|_| ForgeError::Usage(format!("invalid frame count '{count}'")))?;
                    parsed.frames = Some(count);
                }
                other => return Err(ForgeError::Usage(format!("unknown argument '{other}'"))),
            }
        }

        Ok(parsed)
    }
}

/// Human-readable reason for a window subsystem failure
fn window_failure(error: &Error) -> &'static str {
    match error.code::<WindowErrorCode>() {
        Some(WindowErrorCode::FailedToInitializePlatform) => "Failed to initialize GLFW",
        Some(WindowErrorCode::FailedToCreateWindow) => "Failed to create GLFW window",
        Some(WindowErrorCode::FailedToLoadGraphicsApi) => "Failed to load OpenGL functions",
        Some(WindowErrorCode::AlreadyInitialized) => "Window subsystem already initialized",
        Some(WindowErrorCode::AlreadyExists) => "Another window subsystem is running",
        Some(WindowErrorCode::Terminated) => "Window subsystem already terminated",
        None => "Unexpected window error",
    }
}

fn load_config(args: &Args) -> Result<NexusConfig, ForgeError> {
    let config = match &args.config {
        Some(path) => NexusConfig::load_from_file(path)?,
        None => NexusConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn platform(args: &Args) -> Box<dyn WindowPlatform> {
    if args.headless {
        let frames = args.frames.unwrap_or(DEFAULT_HEADLESS_FRAMES);
        Box::new(HeadlessPlatform::new().closing_after(frames))
    } else {
        Box::new(GlfwPlatform::new())
    }
}

fn run(args: &Args, config: &NexusConfig) -> Result<u32, ForgeError> {
    let mut window = Window::new(platform(args)).map_err(ForgeError::startup("window"))?;
    if let Err(error) = window.init(&config.window) {
        log::error!("{}", window_failure(&error));
        return Err(ForgeError::startup("window")(error));
    }

    let frames = render(&mut window, args.frames)?;

    window.deinit();
    Ok(frames)
}

fn render(window: &mut Window, limit: Option<u32>) -> Result<u32, ForgeError> {
    let api = window.graphics();

    let vertex_shader = Shader::create(&api, ShaderKind::Vertex, VERTEX_SHADER)
        .map_err(ForgeError::startup("vertex shader"))?;
    let fragment_shader = Shader::create(&api, ShaderKind::Fragment, FRAGMENT_SHADER)
        .map_err(ForgeError::startup("fragment shader"))?;

    let mut vertex_array = VertexArray::create(&api).map_err(ForgeError::startup("vertex array"))?;
    let mut buffer = Buffer::with_data(&api, BufferUsage::StaticDraw, BufferTarget::ArrayBuffer, &TRIANGLE)
        .map_err(ForgeError::startup("vertex buffer"))?;

    buffer.bind();
    vertex_array.array_attrib(0, 2, DataType::Float, 2 * 4, 0);
    vertex_array.unbind();
    buffer.unbind();

    let mut frames = 0;
    while !window.should_close() && limit.map_or(true, |limit| frames < limit) {
        for event in window.poll_events() {
            log::trace!("{event:?}");
        }

        api.clear_color(0.1, 0.1, 0.12, 1.0);
        api.clear();
        vertex_array.bind();
        buffer.bind();

        window.swap_buffers();
        frames += 1;
    }

    buffer.release();
    vertex_array.release();
    drop((vertex_shader, fragment_shader));
    Ok(frames)
}

fn main() -> ExitCode {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = Logger::init_with(&config.logger) {
        match error.code::<LoggerErrorCode>() {
            Some(LoggerErrorCode::FailedToOpenLogFile) => {
                eprintln!("Failed to open log file: {error}");
            }
            _ => eprintln!("Failed to initialize logger: {error}"),
        }
        return ExitCode::FAILURE;
    }

    log::info!("Starting forge");
    let code = match run(&args, &config) {
        Ok(frames) => {
            log::info!("Forge finished after {frames} frame(s)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    };
    Logger::get().flush();
    code
}
