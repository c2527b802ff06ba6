/// Percentage of frame area occupied by the face box, the proxy for how
/// far the viewer sits from the screen.
///
/// Pure arithmetic, no clamping: inputs must already be clipped to frame
/// bounds (see [`super::FaceBox::clipped`]). Frame dimensions must be
/// non-zero.
pub fn face_area_percent(
    face_width: f32,
    face_height: f32,
    frame_width: u32,
    frame_height: u32,
) -> f64 {
    let frame_area = frame_width as f64 * frame_height as f64;
    let face_area = face_width as f64 * face_height as f64;
    face_area * 100.0 / frame_area
}
