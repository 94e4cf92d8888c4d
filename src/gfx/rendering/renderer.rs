use crate::{
    error::ViewerError,
    gfx::{camera::orbit_camera::OrbitCamera, scene::{asset::Asset, scene::Scene}},
};

/// Everything the presenter needs from a renderer bound to a surface.
///
/// GPU resources for at most one asset exist at a time: `upload_asset` is
/// only called after the previous asset was released.
pub trait SceneRenderer {
    /// Creates GPU resources for every mesh node of `asset`.
    fn upload_asset(&mut self, asset: &Asset);

    /// Frees the GPU resources of the current asset, if any.
    fn release_asset(&mut self);

    /// Draws one frame. Node transforms and materials are read from `scene`
    /// every call, so animation and recoloring show up without re-uploading.
    fn render(&mut self, scene: &Scene, camera: &OrbitCamera) -> Result<(), ViewerError>;

    fn resize(&mut self, width: u32, height: u32);

    /// Releases every remaining GPU resource. Further renders are no-ops.
    fn dispose(&mut self);
}
