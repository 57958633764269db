use crate::graphics::{
    Buffer, BufferTarget, BufferUsage, DataType, GraphicsCall, Shader, ShaderKind, VertexArray,
};
use crate::math::Dimensions;
use crate::sys::window::instance_lock;
use crate::sys::{
    FailurePoint, HeadlessPlatform, PlatformCall, Window, WindowErrorCode, WindowSettings,
    WindowState,
};

const VERTEX_SOURCE: &str = "#version 330 core\nlayout (location = 0) in vec2 position;\nvoid main() { gl_Position = vec4(position, 0.0, 1.0); }\n";
const FRAGMENT_SOURCE: &str = "#version 330 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";

#[test]
fn test_single_frame_buffer_lifecycle() {
    let _guard = instance_lock();
    let platform = HeadlessPlatform::new().closing_after(1);
    let probe = platform.probe();
    let mut window = Window::open(Box::new(platform), &WindowSettings::new(800, 600, "t")).unwrap();
    let graphics = probe.graphics().unwrap();

    let vertices = [0.0_f32, 0.5, -0.5, -0.5, 0.5, -0.5];
    let mut buffer = Buffer::with_data(
        &window.graphics(),
        BufferUsage::StaticDraw,
        BufferTarget::ArrayBuffer,
        &vertices,
    )
    .unwrap();
    assert_ne!(buffer.handle(), 0);
    assert_eq!(buffer.size(), 24);

    let mut frames = 0;
    while !window.should_close() {
        window.poll_events();
        buffer.bind();
        window.swap_buffers();
        frames += 1;
    }
    assert_eq!(frames, 1);
    assert_eq!(probe.count(&PlatformCall::SwapBuffers), 1);

    buffer.release();
    assert_eq!(graphics.live_buffers(), 0);

    window.deinit();
    assert_eq!(window.state(), WindowState::Terminated);
    assert!(!probe.window_exists());
    assert!(!probe.library_initialized());
}

#[test]
fn test_triangle_setup_and_teardown() {
    let _guard = instance_lock();
    let platform = HeadlessPlatform::new().closing_after(3);
    let probe = platform.probe();
    let mut window = Window::open(Box::new(platform), &WindowSettings::default()).unwrap();
    let api = window.graphics();
    let graphics = probe.graphics().unwrap();

    let vertex = Shader::create(&api, ShaderKind::Vertex, VERTEX_SOURCE).unwrap();
    let fragment = Shader::create(&api, ShaderKind::Fragment, FRAGMENT_SOURCE).unwrap();
    let vertex_array = VertexArray::create(&api).unwrap();
    let buffer = Buffer::with_data(
        &api,
        BufferUsage::StaticDraw,
        BufferTarget::ArrayBuffer,
        &[0.0_f32, 0.5, -0.5, -0.5, 0.5, -0.5],
    )
    .unwrap();

    buffer.bind();
    vertex_array.array_attrib(0, 2, DataType::Float, 8, 0);
    assert_eq!(
        graphics.count(|call| matches!(
            call,
            GraphicsCall::VertexAttribPointer { source_buffer, .. } if *source_buffer == buffer.handle()
        )),
        1
    );

    while !window.should_close() {
        window.poll_events();
        vertex_array.bind();
        buffer.bind();
        window.swap_buffers();
    }
    assert_eq!(probe.count(&PlatformCall::SwapBuffers), 3);

    assert_eq!(graphics.live_shaders(), 2);
    drop((vertex, fragment, vertex_array, buffer));
    assert_eq!(graphics.live_shaders(), 0);
    assert_eq!(graphics.live_vertex_arrays(), 0);
    assert_eq!(graphics.live_buffers(), 0);

    drop(api);
    window.deinit();
}

#[test]
fn test_resize_during_frames_moves_viewport() {
    let _guard = instance_lock();
    let platform = HeadlessPlatform::new().with_pixel_ratio(2);
    let probe = platform.probe();
    let mut window = Window::open(Box::new(platform), &WindowSettings::new(640, 480, "r")).unwrap();
    let graphics = probe.graphics().unwrap();
    assert_eq!(graphics.viewport_rect(), Some((0, 0, 1280, 960)));

    probe.resize(320, 240);
    window.poll_events();

    assert_eq!(window.dimensions(), Dimensions::new(320, 240));
    assert_eq!(window.framebuffer_dimensions(), Dimensions::new(640, 480));
    assert_eq!(graphics.viewport_rect(), Some((0, 0, 640, 480)));
}

#[test]
fn test_failed_platform_then_deinit() {
    let _guard = instance_lock();
    let platform = HeadlessPlatform::new().failing_at(FailurePoint::LibraryInit);
    let probe = platform.probe();
    let mut window = Window::new(Box::new(platform)).unwrap();

    let error = window.init(&WindowSettings::new(800, 600, "t")).unwrap_err();
    assert_eq!(
        error.code::<WindowErrorCode>(),
        Some(WindowErrorCode::FailedToInitializePlatform)
    );

    window.deinit();
    assert_eq!(window.state(), WindowState::Terminated);
    assert_eq!(probe.calls(), vec![PlatformCall::InitLibrary]);
}

#[test]
fn test_open_failure_releases_instance_slot() {
    let _guard = instance_lock();
    let failing = HeadlessPlatform::new().failing_at(FailurePoint::GraphicsLoad);

    let error = Window::open(Box::new(failing), &WindowSettings::default()).unwrap_err();
    assert!(error.is(WindowErrorCode::FailedToLoadGraphicsApi));

    let window = Window::open(Box::new(HeadlessPlatform::new()), &WindowSettings::default());
    assert!(window.is_ok());
}
