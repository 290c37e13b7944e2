//! The engine service.
//!
//! [`EngineService`] owns the scene and everything that mutates it: the clip
//! sequencer, the text renderer and a [`RenderBackend`]. It is driven from the
//! outside by three kinds of calls:
//!
//! 1. [`EngineService::load_scene`] once the window exists,
//! 2. [`EngineService::animate`] / [`EngineService::on_host_ready`] to start the loop,
//! 3. [`EngineService::frame`] and [`EngineService::handle_window_event`] from the event loop.
//!
//! All of it runs on the event loop thread; clip completions are handled
//! synchronously inside `frame`.

use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    animation::sequencer::{SequenceState, Sequencer},
    config::SceneConfig,
    data_structures::scene::Scene,
    error::SceneError,
    resources::AssetLoader,
    text::TextRenderer,
};

/// Whatever turns the scene into pixels.
pub trait RenderBackend {
    /// Called once per successfully loaded scene, before the first frame shows it.
    fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()>;

    fn render(&mut self, scene: &Scene) -> anyhow::Result<()>;

    fn resize(&mut self, width: u32, height: u32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderLoop {
    Stopped,
    /// `animate` was called before the host finished loading.
    WaitingForHost,
    Running,
}

pub struct EngineService<B: RenderBackend> {
    config: SceneConfig,
    backend: B,
    scene: Scene,
    sequencer: Sequencer,
    text: Box<dyn TextRenderer>,
    render_loop: RenderLoop,
}

impl<B: RenderBackend> EngineService<B> {
    pub fn new(config: SceneConfig, backend: B, text: Box<dyn TextRenderer>) -> Self {
        let sequencer = Sequencer::new(config.clips.clone());
        Self {
            config,
            backend,
            scene: Scene::new(),
            sequencer,
            text,
            render_loop: RenderLoop::Stopped,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn sequence_state(&self) -> SequenceState {
        self.sequencer.state()
    }

    pub fn render_loop(&self) -> RenderLoop {
        self.render_loop
    }

    /// Loads the configured asset and composes the scene.
    ///
    /// A failed load is logged and leaves an empty scene. A missing clip or
    /// anchor is logged and only skips the step that needed it. Anything else
    /// (bad colours, unusable text, GPU upload) is returned. On every failure
    /// the backend is handed the empty scene so it stops drawing the old one.
    pub async fn load_scene(&mut self, loader: &impl AssetLoader) -> anyhow::Result<()> {
        self.scene = Scene::new();
        self.sequencer = Sequencer::new(self.config.clips.clone());

        let scene = match loader.load(&self.config.asset_file).await {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("Scene loader failed for {}: {:#}", self.config.asset_file, e);
                return self.backend.prepare(&self.scene);
            }
        };
        log::info!("Scene loader succeeded for {}", self.config.asset_file);

        match self.compose(scene) {
            Ok(scene) => {
                self.backend.prepare(&scene)?;
                self.scene = scene;
                Ok(())
            }
            Err(e) => {
                self.sequencer = Sequencer::new(self.config.clips.clone());
                self.backend.prepare(&self.scene)?;
                Err(e)
            }
        }
    }

    fn compose(&mut self, mut scene: Scene) -> anyhow::Result<Scene> {
        scene.stop_all_animations();

        if let Err(e) = self.sequencer.begin(&mut scene) {
            log::error!("Box animation not started: {}", e);
        }

        match self.text.attach(&mut scene) {
            Ok(_) => (),
            Err(e @ SceneError::MissingSceneObject { .. }) => {
                log::error!("Text not attached: {}", e)
            }
            Err(e) => return Err(e.into()),
        }

        match scene.mesh_by_name(&self.config.box_mesh) {
            Ok(id) => log::debug!("{} at {:?}", self.config.box_mesh, scene.world(id)?.position),
            Err(e) => log::debug!("{}", e),
        }
        Ok(scene)
    }

    /// Starts the render loop now if the host is ready, otherwise as soon as
    /// [`EngineService::on_host_ready`] is called. Calling it again is a no-op.
    pub fn animate(&mut self, host_ready: bool) {
        match (self.render_loop, host_ready) {
            (RenderLoop::Running, _) => (),
            (_, true) => {
                log::info!("Render loop started");
                self.render_loop = RenderLoop::Running;
            }
            (_, false) => self.render_loop = RenderLoop::WaitingForHost,
        }
    }

    pub fn on_host_ready(&mut self) {
        if self.render_loop == RenderLoop::WaitingForHost {
            self.animate(true);
        }
    }

    /// Advances animations by `dt`, feeds finished clips to the sequencer and
    /// renders. Does nothing until the loop runs.
    pub fn frame(&mut self, dt: Duration) -> anyhow::Result<()> {
        if self.render_loop != RenderLoop::Running {
            return Ok(());
        }
        for clip in self.scene.advance_animations(dt.as_secs_f32()) {
            if let Err(e) = self.sequencer.on_clip_ended(&clip, &mut self.scene) {
                log::error!("Sequence step after {} failed: {}", clip, e);
            }
        }
        self.backend.render(&self.scene)
    }

    /// Forwards resizes to the backend once the loop runs.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::Resized(size) = event {
            if self.render_loop == RenderLoop::Running {
                self.backend.resize(size.width, size.height);
            }
        }
    }
}
