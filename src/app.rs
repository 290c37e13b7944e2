//! The windowed application.
//!
//! [`run`] opens a window, builds a [`Context`] and an [`EngineService`] on top
//! of it, loads the scene and then drives the engine from winit's event loop:
//!
//! 1. `resumed` creates the window and starts initialisation,
//! 2. once the engine is loaded the render loop is started,
//! 3. every `RedrawRequested` advances animations by the elapsed time and renders,
//! 4. window events go to the camera controller and the engine.
//!
//! On the web initialisation runs on `spawn_local` and the finished engine is
//! handed back through a user event.

use std::{fmt::Debug, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::UnwrapThrowExt;

use crate::{
    config::SceneConfig,
    context::Context,
    engine::EngineService,
    resources::GltfLoader,
    text::{RusttypeFace, text_renderer},
};

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    Initialized(Box<EngineService<Context>>),
    #[allow(dead_code)]
    Failed(String),
}

impl Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Creates the GPU context, the text renderer and the engine, then loads the scene.
async fn build_engine(
    window: Arc<Window>,
    config: SceneConfig,
) -> anyhow::Result<EngineService<Context>> {
    let ctx = Context::new(window, &config).await?;
    let asset_root = config.asset_root.clone();
    let typeface = RusttypeFace::load(&asset_root, config.active_font_family()).await?;
    let text = text_renderer(&config, Box::new(typeface));
    let mut engine = EngineService::new(config, ctx, text);
    engine.load_scene(&GltfLoader::new(asset_root)).await?;
    Ok(engine)
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    // taken when the window is created
    config: Option<SceneConfig>,
    engine: Option<EngineService<Context>>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            engine: None,
            last_time: Instant::now(),
        })
    }

    fn start(&mut self, mut engine: EngineService<Context>) {
        engine.animate(true);
        engine.backend().window().request_redraw();
        self.last_time = Instant::now();
        self.engine = Some(engine);
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&config.window_title);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the main window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = build_engine(window, config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(engine) => self.start(engine),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(engine) => AppEvent::Initialized(Box::new(engine)),
                    Err(e) => AppEvent::Failed(format!("{:#}", e)),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("Event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(engine) => self.start(*engine),
            AppEvent::Failed(e) => {
                log::error!("App initialization failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let engine = match &mut self.engine {
            Some(engine) => engine,
            None => return,
        };

        let ctx = engine.backend_mut();
        ctx.camera
            .controller
            .handle_window_event(&event, &mut ctx.camera.camera);

        engine.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                if let Err(e) = engine.frame(dt) {
                    log::error!("Unable to render {:#}", e);
                }
            }
            _ => {}
        }
    }
}

/// Opens the window and runs the scene until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
