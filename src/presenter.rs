//! # Asset Presenter
//!
//! Owns the scene, the camera rig and a renderer, and keeps exactly one
//! asset on stage. Loading a new asset first detaches the old one
//! (animations stopped, GPU resources released), then requests the new one
//! from an [`AssetLoader`]. Completions arrive on a channel and are applied
//! during [`AssetPresenter::tick`], so all scene mutation happens on the
//! thread that owns the presenter.

use std::time::Instant;

use futures::channel::mpsc::{self, UnboundedReceiver};

use crate::{
    config::ViewerConfig,
    error::ViewerResult,
    gfx::{
        camera::CameraManager,
        color::Color,
        rendering::renderer::SceneRenderer,
        scene::{
            lights::LightingRig,
            scene::{ResidentAsset, Scene},
        },
    },
    loader::{AssetLoader, CompletionSender, LoadCompletion, LoadRequest, LoadToken},
};

/// Longest simulated step per frame. Longer gaps (window dragged, debugger
/// paused) do not make animations jump.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Lifecycle of the resident asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterState {
    Empty,
    Loading { url: String },
    Loaded { url: String },
}

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

pub struct AssetPresenter<R: SceneRenderer> {
    renderer: R,
    scene: Scene,
    camera: CameraManager,
    loader: Box<dyn AssetLoader>,
    completions_tx: CompletionSender,
    completions_rx: UnboundedReceiver<LoadCompletion>,
    last_token: LoadToken,
    /// Token of the only load whose completion is still wanted
    pending: Option<LoadToken>,
    state: PresenterState,
    running: bool,
    disposed: bool,
    last_frame: Option<Instant>,
}

impl<R: SceneRenderer> AssetPresenter<R> {
    /// Creates a presenter drawing through `renderer`, with the default
    /// lighting rig and camera. Nothing is loaded until [`Self::start`] or
    /// [`Self::load_asset`].
    pub fn new(renderer: R, loader: Box<dyn AssetLoader>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded();
        Self {
            renderer,
            scene: Scene::new(LightingRig::default()),
            camera: CameraManager::default(),
            loader,
            completions_tx,
            completions_rx,
            last_token: LoadToken(0),
            pending: None,
            state: PresenterState::Empty,
            running: false,
            disposed: false,
            last_frame: None,
        }
    }

    /// Loads the first configured asset and starts the render loop.
    pub fn start(&mut self, config: &ViewerConfig) {
        if self.disposed {
            log::warn!("start() called on a disposed presenter");
            return;
        }

        self.running = true;
        self.last_frame = None;
        match config.asset_urls.first() {
            Some(url) => self.load_asset(url),
            None => log::warn!("No asset URLs configured; starting with an empty scene"),
        }
    }

    /// Replaces the resident asset with the one at `url`.
    ///
    /// The current asset is detached immediately. The new one shows up once
    /// its load completes; a newer `load_asset` call supersedes this one.
    pub fn load_asset(&mut self, url: &str) {
        if self.disposed {
            log::warn!("Ignoring load of {} on a disposed presenter", url);
            return;
        }

        self.detach();

        let token = self.last_token.next();
        self.last_token = token;
        self.pending = Some(token);
        self.state = PresenterState::Loading {
            url: url.to_string(),
        };
        log::info!("Loading {}", url);

        self.loader.load(
            LoadRequest {
                token,
                url: url.to_string(),
            },
            self.completions_tx.clone(),
        );
    }

    /// Applies every load completion received so far.
    pub fn poll_loads(&mut self) {
        while let Ok(Some(completion)) = self.completions_rx.try_next() {
            self.apply_completion(completion);
        }
    }

    fn apply_completion(&mut self, completion: LoadCompletion) {
        let LoadCompletion { token, url, result } = completion;
        if self.pending != Some(token) {
            log::debug!("Discarding stale load of {} ({:?})", url, token);
            return;
        }
        self.pending = None;

        match result {
            Ok(data) => {
                self.renderer.upload_asset(&data.asset);

                let bounds = data.asset.bounding_box();
                if !self.camera.frame(&bounds) {
                    log::debug!("{} has no visible geometry; camera left in place", url);
                }

                let resident = ResidentAsset::new(data.asset, data.animations);
                log::info!(
                    "Loaded {} ({} mesh nodes, {} animations)",
                    url,
                    resident.asset.mesh_nodes().len(),
                    resident.animations.len()
                );
                if let Some(previous) = self.scene.attach(resident) {
                    log::warn!("Replaced {} without detaching it", previous.asset.url);
                }
                self.state = PresenterState::Loaded { url };
            }
            Err(err) => {
                log::error!("{}", err);
                self.state = PresenterState::Empty;
            }
        }
    }

    fn detach(&mut self) {
        if let Some(previous) = self.scene.detach() {
            self.renderer.release_asset();
            log::debug!("Detached {}", previous.asset.url);
        }
        self.state = PresenterState::Empty;
    }

    /// Overwrites the base color of every mesh material of the resident
    /// asset. Does nothing while no asset is resident.
    pub fn set_color(&mut self, color: Color) {
        match self.scene.resident_mut() {
            Some(resident) => {
                let count = resident.asset.recolor(color);
                log::info!("Recolored {} materials to {}", count, color);
            }
            None => log::debug!("No asset resident; ignoring color {}", color),
        }
    }

    /// Parses `text` as `#rgb`/`#rrggbb` and applies it with [`Self::set_color`].
    pub fn set_color_str(&mut self, text: &str) -> ViewerResult<()> {
        let color = Color::from_hex(text)?;
        self.set_color(color);
        Ok(())
    }

    /// Plays the clip called `name` alone, from its start.
    ///
    /// Returns `false` and changes nothing when no asset with animations is
    /// resident or no clip has that name.
    pub fn play_animation(&mut self, name: &str) -> bool {
        let Some(resident) = self.scene.resident_mut() else {
            log::debug!("No asset resident; ignoring animation {}", name);
            return false;
        };
        let Some(index) = resident.animations.find(name) else {
            log::warn!("No animation named '{}' in {}", name, resident.asset.url);
            return false;
        };
        let Some(player) = resident.player.as_mut() else {
            return false;
        };

        player.stop_all(&mut resident.asset);
        player.play(index);
        log::info!("Playing animation '{}'", name);
        true
    }

    /// Runs one frame using the wall clock for the animation step.
    pub fn tick(&mut self) -> LoopControl {
        if !self.running {
            return LoopControl::Stop;
        }

        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.tick_with_delta(dt)
    }

    /// Runs one frame advancing animations by `dt` seconds (clamped to
    /// [`MAX_FRAME_DELTA`]).
    pub fn tick_with_delta(&mut self, dt: f32) -> LoopControl {
        if !self.running {
            return LoopControl::Stop;
        }

        self.poll_loads();

        let dt = dt.clamp(0.0, MAX_FRAME_DELTA);
        if let Some(resident) = self.scene.resident_mut() {
            resident.animate(dt);
        }
        self.camera.update();

        if let Err(err) = self.renderer.render(&self.scene, &self.camera.camera) {
            log::warn!("Frame skipped: {}", err);
        }
        LoopControl::Continue
    }

    /// Stops the render loop and releases the asset and renderer resources.
    /// Any load still in flight is discarded when it completes. Safe to call
    /// more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.running = false;
        self.pending = None;

        self.detach();
        self.renderer.dispose();
        log::info!("Presenter disposed");
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.resize(width, height);
        self.renderer.resize(width, height);
    }

    pub fn state(&self) -> &PresenterState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraManager {
        &mut self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Clip names of the resident asset, empty while none is resident
    pub fn animation_names(&self) -> Vec<String> {
        self.scene
            .resident()
            .map(|resident| resident.animations.names())
            .unwrap_or_default()
    }

    /// Names of the clips currently playing
    pub fn active_animations(&self) -> Vec<String> {
        let Some(resident) = self.scene.resident() else {
            return Vec::new();
        };
        let Some(player) = resident.player.as_ref() else {
            return Vec::new();
        };
        player
            .active_clips()
            .into_iter()
            .filter_map(|index| resident.animations.get(index))
            .map(|clip| clip.name.clone())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, rc::Rc};

    use cgmath::Vector3;

    use super::*;
    use crate::{
        animation::{clip::tests::translation_channel, AnimationClip, AnimationSet},
        error::ViewerError,
        gfx::{camera::orbit_camera::OrbitCamera, scene::asset::tests::cube_asset, scene::asset::Asset},
        loader::{AssetData, FileSource, InlineLoader},
    };

    /// Renderer that records calls instead of touching a GPU
    #[derive(Debug, Default)]
    pub(crate) struct RecordingRenderer {
        pub uploads: Vec<String>,
        pub releases: usize,
        pub frames: usize,
        pub resident: Option<String>,
        pub disposed: bool,
    }

    impl SceneRenderer for RecordingRenderer {
        fn upload_asset(&mut self, asset: &Asset) {
            assert!(self.resident.is_none(), "uploaded over a live asset");
            self.uploads.push(asset.url.clone());
            self.resident = Some(asset.url.clone());
        }

        fn release_asset(&mut self) {
            self.releases += 1;
            self.resident = None;
        }

        fn render(&mut self, _scene: &Scene, _camera: &OrbitCamera) -> Result<(), ViewerError> {
            self.frames += 1;
            Ok(())
        }

        fn resize(&mut self, _width: u32, _height: u32) {}

        fn dispose(&mut self) {
            self.disposed = true;
        }
    }

    /// Loader that parks requests until the test completes them
    #[derive(Clone, Default)]
    pub(crate) struct ManualLoader {
        pub requests: Rc<RefCell<Vec<(LoadRequest, CompletionSender)>>>,
    }

    impl AssetLoader for ManualLoader {
        fn load(&self, request: LoadRequest, completions: CompletionSender) {
            self.requests.borrow_mut().push((request, completions));
        }
    }

    impl ManualLoader {
        pub fn urls(&self) -> Vec<String> {
            self.requests.borrow().iter().map(|(r, _)| r.url.clone()).collect()
        }

        /// Completes request `index` with `result`.
        pub fn complete(&self, index: usize, result: Result<AssetData, ViewerError>) {
            let requests = self.requests.borrow();
            let (request, tx) = &requests[index];
            tx.unbounded_send(LoadCompletion {
                token: request.token,
                url: request.url.clone(),
                result,
            })
            .unwrap();
        }

        /// Completes request `index` with a cube asset named after its URL.
        pub fn complete_with_cube(&self, index: usize, offset: Vector3<f32>) {
            let url = self.requests.borrow()[index].0.url.clone();
            self.complete(
                index,
                Ok(AssetData {
                    asset: cube_asset(&url, offset),
                    animations: AnimationSet::default(),
                }),
            );
        }
    }

    pub(crate) fn presenter() -> (AssetPresenter<RecordingRenderer>, ManualLoader) {
        let loader = ManualLoader::default();
        let presenter = AssetPresenter::new(RecordingRenderer::default(), Box::new(loader.clone()));
        (presenter, loader)
    }

    pub(crate) fn animated_cube(url: &str) -> AssetData {
        AssetData {
            asset: cube_asset(url, Vector3::new(0.0, 0.0, 0.0)),
            animations: AnimationSet::new(vec![
                AnimationClip::new("Idle", vec![translation_channel(1, vec![0.0, 1.0], vec![0.0, 1.0])]),
                AnimationClip::new("Wave", vec![translation_channel(1, vec![0.0, 1.0], vec![0.0, 2.0])]),
                AnimationClip::new("Jump", vec![translation_channel(1, vec![0.0, 1.0], vec![0.0, 3.0])]),
            ]),
        }
    }

    #[test]
    fn test_start_loads_first_asset_and_renders_frames() {
        let (mut presenter, loader) = presenter();
        let config = ViewerConfig::new(["a.glb", "b.glb"]);

        presenter.start(&config);
        assert_eq!(loader.urls(), vec!["a.glb".to_string()]);
        assert_eq!(presenter.state(), &PresenterState::Loading { url: "a.glb".into() });

        loader.complete_with_cube(0, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(presenter.tick_with_delta(0.016), LoopControl::Continue);
        assert_eq!(presenter.tick_with_delta(0.016), LoopControl::Continue);

        assert_eq!(presenter.state(), &PresenterState::Loaded { url: "a.glb".into() });
        assert_eq!(presenter.renderer().frames, 2);
    }

    #[test]
    fn test_start_with_no_assets_still_runs() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(Vec::<String>::new()));

        assert!(loader.urls().is_empty());
        assert_eq!(presenter.state(), &PresenterState::Empty);
        assert_eq!(presenter.tick_with_delta(0.016), LoopControl::Continue);
        assert_eq!(presenter.renderer().frames, 1);
    }

    #[test]
    fn test_loading_replaces_and_releases_previous_asset() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(["a.glb"]));
        loader.complete_with_cube(0, Vector3::new(0.0, 0.0, 0.0));
        presenter.poll_loads();

        presenter.load_asset("b.glb");
        // Detach is synchronous
        assert!(presenter.scene().asset().is_none());
        assert_eq!(presenter.renderer().releases, 1);

        loader.complete_with_cube(1, Vector3::new(0.0, 0.0, 0.0));
        presenter.poll_loads();

        assert_eq!(presenter.scene().asset().map(|a| a.url.as_str()), Some("b.glb"));
        assert_eq!(presenter.renderer().uploads, vec!["a.glb".to_string(), "b.glb".to_string()]);
        assert_eq!(presenter.renderer().resident.as_deref(), Some("b.glb"));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(["a.glb"]));
        presenter.load_asset("b.glb");

        // b finishes first, then the superseded a
        loader.complete_with_cube(1, Vector3::new(0.0, 0.0, 0.0));
        loader.complete_with_cube(0, Vector3::new(0.0, 0.0, 0.0));
        presenter.tick_with_delta(0.016);

        assert_eq!(presenter.state(), &PresenterState::Loaded { url: "b.glb".into() });
        assert_eq!(presenter.renderer().uploads, vec!["b.glb".to_string()]);
    }

    #[test]
    fn test_set_color_without_asset_is_a_no_op() {
        let (mut presenter, _loader) = presenter();
        presenter.set_color(Color::new(1.0, 0.0, 0.0));
        assert!(presenter.scene().asset().is_none());
    }

    #[test]
    fn test_set_color_recolors_every_mesh() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(["a.glb"]));
        loader.complete_with_cube(0, Vector3::new(0.0, 0.0, 0.0));
        presenter.poll_loads();

        presenter.set_color_str("#00ff00").unwrap();
        let asset = presenter.scene().asset().unwrap();
        for id in asset.mesh_nodes() {
            let material = &asset.nodes[id].as_mesh().unwrap().material;
            assert_eq!(material.color().to_hex(), "#00ff00");
        }

        assert!(presenter.set_color_str("green-ish").is_err());
        let material = &presenter.scene().asset().unwrap().nodes[1].as_mesh().unwrap().material;
        assert_eq!(material.color().to_hex(), "#00ff00");
    }

    #[test]
    fn test_all_clips_play_after_load_and_selection_plays_one() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(["robot.glb"]));
        loader.complete(0, Ok(animated_cube("robot.glb")));
        presenter.poll_loads();

        assert_eq!(presenter.animation_names(), vec!["Idle", "Wave", "Jump"]);
        assert_eq!(presenter.active_animations().len(), 3);

        assert!(presenter.play_animation("Wave"));
        assert_eq!(presenter.active_animations(), vec!["Wave".to_string()]);

        presenter.tick_with_delta(0.05);
        let y = presenter.scene().asset().unwrap().nodes[1].transform.translation.y;
        assert!((y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_animation_keeps_current_actions() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(["robot.glb"]));
        loader.complete(0, Ok(animated_cube("robot.glb")));
        presenter.poll_loads();
        presenter.play_animation("Jump");

        assert!(!presenter.play_animation("Dance"));
        assert_eq!(presenter.active_animations(), vec!["Jump".to_string()]);
    }

    #[test]
    fn test_camera_frames_loaded_asset() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(["a.glb"]));
        loader.complete_with_cube(0, Vector3::new(3.0, 1.0, 0.0));
        presenter.poll_loads();

        let bounds = presenter.scene().asset().unwrap().bounding_box();
        let camera = &presenter.camera().camera;
        assert_eq!(camera.target, bounds.center());
        assert_eq!(camera.target, Vector3::new(3.0, 1.0, 0.0));
        assert!((camera.eye.z - bounds.diagonal() * 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_missing_file_leaves_presenter_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loader = InlineLoader::new(FileSource::new(dir.path()));
        let mut presenter = AssetPresenter::new(RecordingRenderer::default(), Box::new(loader));

        presenter.start(&ViewerConfig::new(["does/not/exist.glb"]));
        assert_eq!(presenter.tick_with_delta(0.016), LoopControl::Continue);

        assert_eq!(presenter.state(), &PresenterState::Empty);
        assert!(presenter.renderer().uploads.is_empty());
    }

    #[test]
    fn test_dispose_stops_loop_and_drops_in_flight_load() {
        let (mut presenter, loader) = presenter();
        presenter.start(&ViewerConfig::new(["a.glb"]));
        presenter.tick_with_delta(0.016);

        presenter.dispose();
        presenter.dispose();
        loader.complete_with_cube(0, Vector3::new(0.0, 0.0, 0.0));

        assert_eq!(presenter.tick(), LoopControl::Stop);
        assert_eq!(presenter.renderer().frames, 1);
        assert!(presenter.renderer().disposed);
        assert!(presenter.renderer().uploads.is_empty());
        assert!(presenter.scene().asset().is_none());
    }
}
