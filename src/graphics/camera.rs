use glam::{Mat4, Vec3};

/// Camera state consumed at `begin_scene`. Implementations live outside the
/// core; orbit/fly controllers, projection math and input all stay with the
/// host application.
pub trait Camera {
    fn view_projection(&self) -> Mat4;
    fn view(&self) -> Mat4;
    fn projection(&self) -> Mat4;
    fn position(&self) -> Vec3;
}
